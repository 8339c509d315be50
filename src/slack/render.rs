use anyhow::Result;
use serde_json::{json, Value};

use crate::alert::{message::AlertMessage, resource::Resource};

use super::{
    blocks::{SlackDivider, SlackHeader, SlackSection},
    message::{RenderTarget, SlackMessageRenderer},
};

/// The most resources listed in a single message.
const MAX_LISTED_RESOURCES: usize = 20;

/// Renders an alert as a header, a summary section, and a list of resource identifiers.
///
/// Real deployments plug their own templates in through `SlackMessageRenderer`. This renderer
/// only needs the alert itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl SlackMessageRenderer for PlainTextRenderer {
    fn render(
        &self,
        target: &RenderTarget,
        message: &AlertMessage,
        resources: &[&Resource],
    ) -> Result<Value> {
        let policy = message.policy();
        let title = message.action().subject().map(|s| s.to_string()).unwrap_or_else(|| {
            format!(
                "{} matched {} {} resource(s)",
                policy.name(),
                resources.len(),
                policy.resource()
            )
        });
        let mut summary = vec![format!(
            "*Policy:* `{}`\n*Account:* {}{}{}",
            policy.name(),
            message.account(),
            message
                .account_id()
                .map(|id| format!(" `{}`", id))
                .unwrap_or_default(),
            message
                .region()
                .map(|r| format!(" ({})", r))
                .unwrap_or_default()
        )];
        if let RenderTarget::User { email, .. } = target {
            summary.push(format!("Sent to you as {}.", email));
        }
        let descriptions = [
            message.action().violation_desc(),
            message.action().action_desc(),
            policy.description(),
        ];
        summary.extend(descriptions.into_iter().flatten().map(|d| d.to_string()));
        let mut listed = resources
            .iter()
            .take(MAX_LISTED_RESOURCES)
            .enumerate()
            .map(|(i, r)| {
                let identifier =
                    resource_identifier(r).unwrap_or_else(|| format!("resource #{}", i + 1));
                format!("• {}", identifier)
            })
            .collect::<Vec<_>>();
        if resources.len() > MAX_LISTED_RESOURCES {
            listed.push(format!("…and {} more", resources.len() - MAX_LISTED_RESOURCES));
        }
        let mut blocks = vec![
            json!(SlackHeader::new(&title)),
            json!(SlackSection::from_markdown(&summary.join("\n"))),
        ];
        if !listed.is_empty() {
            blocks.push(json!(SlackDivider));
            blocks.push(json!(SlackSection::from_markdown(&format!(
                "*{}:*\n{}",
                policy.resource(),
                listed.join("\n")
            ))));
        }
        Ok(json!({
            "text": title,
            "blocks": blocks,
        }))
    }
}

/// Picks the attribute most likely to identify a resource, such as `VolumeId` or `Arn`.
fn resource_identifier(resource: &Resource) -> Option<String> {
    let attributes = resource.attributes();
    attributes
        .iter()
        .find(|(key, value)| key.ends_with("Id") && value.is_string())
        .map(|(_, value)| value)
        .or_else(|| {
            ["Arn", "ARN", "Name", "name", "id"]
                .iter()
                .find_map(|key| attributes.get(*key))
        })
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}
