use std::{
    collections::BTreeMap,
    error::Error,
    fmt::{Display, Formatter},
};

use anyhow::Result;
use log::{debug, error};
use serde_json::Value;

use crate::alert::{message::AlertMessage, resource::Resource};

use super::{
    destination::{alert_destinations, SlackDestination},
    tag::{resolve_tag_channels, TagResolution},
    users::SlackUserLookup,
};

/// Who a rendered message is addressed to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RenderTarget<'a> {
    Channel(&'a str),
    /// A direct message to the Slack member `id`, resolved from `email`.
    User { id: &'a str, email: &'a str },
    Webhook(&'a str),
}

impl<'a> RenderTarget<'a> {
    /// The key that the rendered message is stored and sent under.
    pub fn address(&self) -> &'a str {
        match *self {
            Self::Channel(name) => name,
            Self::User { id, .. } => id,
            Self::Webhook(url) => url,
        }
    }

    /// The value of the payload's `channel` field.
    ///
    /// Webhooks have none since the URL already decides where the message goes.
    pub fn channel(&self) -> Option<&'a str> {
        match *self {
            Self::Channel(name) => Some(name),
            Self::User { id, .. } => Some(id),
            Self::Webhook(_) => None,
        }
    }
}

/// A trait for rendering the Slack payload of an alert for a single recipient.
pub trait SlackMessageRenderer {
    /// Renders a JSON object payload for `target` describing `resources`.
    ///
    /// The `channel` field of the returned payload is overwritten when the message is composed.
    fn render(
        &self,
        target: &RenderTarget,
        message: &AlertMessage,
        resources: &[&Resource],
    ) -> Result<Value>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum SlackRenderError {
    NotAnObject,
    Empty,
}

impl Display for SlackRenderError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "Slack Render Error: payload is not a JSON object"),
            Self::Empty => write!(f, "Slack Render Error: payload is empty"),
        }
    }
}

impl Error for SlackRenderError {}

/// Serialized Slack payloads keyed by the channel, member ID, or webhook URL they are sent to.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SlackMessages(BTreeMap<String, String>);

impl SlackMessages {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(a, p)| (a.as_str(), p.as_str()))
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|a| a.as_str())
    }
}

impl SlackMessages {
    fn render(
        &mut self,
        renderer: &impl SlackMessageRenderer,
        target: RenderTarget,
        message: &AlertMessage,
        resources: &[&Resource],
    ) {
        let payload = renderer
            .render(&target, message, resources)
            .and_then(|payload| finalize_payload(payload, &target));
        match payload {
            Ok(payload) => {
                self.0.insert(target.address().to_string(), payload);
            }
            Err(err) => error!(
                "Could not render Slack message for {}: {:#}",
                target.address(),
                err
            ),
        }
    }
}

fn finalize_payload(payload: Value, target: &RenderTarget) -> Result<String> {
    let Value::Object(mut fields) = payload else {
        return Err(SlackRenderError::NotAnObject.into());
    };
    if fields.is_empty() {
        return Err(SlackRenderError::Empty.into());
    }
    match target.channel() {
        Some(channel) => {
            fields.insert("channel".to_string(), Value::String(channel.to_string()));
        }
        None => {
            fields.remove("channel");
        }
    }
    Ok(serde_json::to_string(&Value::Object(fields))?)
}

/// Resolves every destination of `message` and renders one payload per resolved address.
///
/// Tag references render only the resources carrying the tag, every other destination renders
/// all resources. Emails are looked up together through `users` once the other destinations are
/// done.
pub async fn compose_slack_messages(
    message: &AlertMessage,
    users: &impl SlackUserLookup,
    renderer: &impl SlackMessageRenderer,
) -> SlackMessages {
    let resources = message.resources().iter().collect::<Vec<_>>();
    let mut messages = SlackMessages::default();
    let mut emails = Vec::<String>::new();
    for destination in alert_destinations(message) {
        debug!("Resolving Slack {} destination {:?}.", destination.kind(), destination);
        match destination {
            SlackDestination::Channel(name) => {
                messages.render(renderer, RenderTarget::Channel(&name), message, &resources);
            }
            SlackDestination::Tag(tag_name) => {
                let TagResolution::Found(channels) =
                    resolve_tag_channels(&tag_name, message.resources())
                else {
                    continue;
                };
                for (channel, tagged) in channels.iter() {
                    messages.render(renderer, RenderTarget::Channel(channel), message, tagged);
                }
            }
            SlackDestination::Webhook(url) => {
                messages.render(renderer, RenderTarget::Webhook(&url), message, &resources);
            }
            SlackDestination::User(email) => emails.push(email),
        }
    }
    if !emails.is_empty() {
        let user_ids = users.lookup_user_ids(&emails).await;
        for (email, id) in user_ids.iter() {
            messages.render(renderer, RenderTarget::User { id, email }, message, &resources);
        }
        debug!(
            "Generating messages for {} of {} Slack users.",
            user_ids.len(),
            emails.len()
        );
    }
    messages
}

#[cfg(test)]
impl SlackMessages {
    pub fn get(&self, address: &str) -> Option<&str> {
        self.0.get(address).map(|p| p.as_str())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.0.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
