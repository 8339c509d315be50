use futures::{stream, StreamExt};
use log::{debug, info};

use crate::alert::message::AlertMessage;

use super::{
    api::{SlackApiResult, SlackHttpRequest, SlackTransport, POST_MESSAGE_URL},
    client::SlackClient,
    destination::WEBHOOK_PREFIX,
    message::SlackMessages,
    retry::Sleep,
};

/// The outcome of sending one rendered message.
#[derive(Debug, PartialEq, Clone)]
pub struct SlackDelivery {
    address: String,
    result: SlackApiResult,
}

impl SlackDelivery {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

#[cfg(test)]
impl SlackDelivery {
    pub fn result(&self) -> &SlackApiResult {
        &self.result
    }
}

impl<T: SlackTransport + Sync, S: Sleep + Sync> SlackClient<T, S> {
    /// Sends a rendered payload to `address`.
    ///
    /// Webhook URLs are posted to directly without credentials, everything else goes through
    /// `chat.postMessage` with the payload's `channel` field deciding the recipient. Failures are
    /// logged and returned, never raised.
    pub async fn send(&self, address: &str, payload: &str) -> SlackApiResult {
        let request = &if address.starts_with(WEBHOOK_PREFIX) {
            SlackHttpRequest::json(address, payload, None)
        } else {
            SlackHttpRequest::json(POST_MESSAGE_URL, payload, self.token())
        };
        let result = self
            .retry_policy
            .run(&self.sleeper, move || self.call(request))
            .await;
        match &result {
            SlackApiResult::Success(_) => debug!("Sent Slack message to {}.", address),
            SlackApiResult::RateLimited(_) => {
                info!(
                    "Gave up sending Slack message to {} after {} rate limited attempts.",
                    address,
                    self.retry_policy.max_attempts()
                )
            }
            SlackApiResult::HttpError { status, body } => info!(
                "Error in sending Slack message status:{} response: {}",
                status, body
            ),
            SlackApiResult::ApplicationError { status, error } => info!(
                "Error in sending Slack message. Status:{}, response:{}",
                status, error
            ),
            SlackApiResult::Transport(description) => info!(
                "Error in sending Slack message to {}: {}",
                address, description
            ),
        }
        result
    }

    /// Sends every message composed for `message` and logs a summary of where it went.
    ///
    /// Each address is attempted regardless of how the others fared.
    pub async fn deliver(
        &self,
        message: &AlertMessage,
        messages: &SlackMessages,
    ) -> Vec<SlackDelivery> {
        let deliveries = stream::iter(messages.iter())
            .map(move |(address, payload)| async move {
                SlackDelivery {
                    address: address.to_string(),
                    result: self.send(address, payload).await,
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        let destinations = if messages.is_empty() {
            "no destinations".to_string()
        } else {
            messages.addresses().collect::<Vec<_>>().join(", ")
        };
        info!(
            "Sending account:{} policy:{} {}:{} slack:{} to {}",
            message.account(),
            message.policy().name(),
            message.policy().resource(),
            message.resources().len(),
            message.action().slack_template(),
            destinations
        );
        deliveries
    }
}
