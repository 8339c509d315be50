use std::{collections::BTreeMap, future::Future};

use futures::{future, stream, StreamExt};
use log::{debug, error, info};
use serde::Deserialize;

use crate::utils::dedup::DedupIterator;

use super::{
    api::{SlackApiResult, SlackHttpRequest, SlackTransport, LOOKUP_BY_EMAIL_URL},
    client::SlackClient,
    retry::Sleep,
};

/// The error code Slack answers with when no member has the requested email.
const USERS_NOT_FOUND: &str = "users_not_found";

/// Slack member IDs keyed by email address.
pub type SlackUserIds = BTreeMap<String, String>;

/// A trait for finding the Slack members that own a set of email addresses.
pub trait SlackUserLookup {
    /// Returns the Slack member ID of each email that could be resolved.
    ///
    /// Emails that cannot be resolved are left out of the result.
    fn lookup_user_ids(&self, emails: &[String]) -> impl Future<Output = SlackUserIds> + Send;
}

#[derive(Debug, Deserialize)]
struct LookupByEmailResponse {
    user: SlackUser,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
    id: String,
    enterprise_user: Option<SlackEnterpriseUser>,
}

#[derive(Debug, Deserialize)]
struct SlackEnterpriseUser {
    id: String,
}

impl SlackUser {
    /// Enterprise Grid members are addressed by their enterprise-wide ID.
    fn preferred_id(self) -> String {
        self.enterprise_user.map(|u| u.id).unwrap_or(self.id)
    }
}

impl<T: SlackTransport + Sync, S: Sleep + Sync> SlackUserLookup for SlackClient<T, S> {
    async fn lookup_user_ids(&self, emails: &[String]) -> SlackUserIds {
        let Some(token) = self.token() else {
            info!("No Slack token found.");
            return SlackUserIds::new();
        };
        let emails = emails.iter().dedup().cloned().collect::<Vec<_>>();
        stream::iter(emails)
            .map(move |email| async move {
                let id = self.lookup_user_id(&email, token).await;
                (email, id)
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|(email, id)| future::ready(id.map(|id| (email, id))))
            .collect::<SlackUserIds>()
            .await
    }
}

impl<T: SlackTransport + Sync, S: Sleep + Sync> SlackClient<T, S> {
    async fn lookup_user_id(&self, email: &str, token: &str) -> Option<String> {
        if let Some(cached) = self.user_ids.lock().await.get(email) {
            debug!("Got Slack metadata from cache for: {}", email);
            return cached.clone();
        }
        let request =
            &SlackHttpRequest::form(LOOKUP_BY_EMAIL_URL, &[("email", email)], Some(token));
        let result = self
            .retry_policy
            .run(&self.sleeper, move || self.call(request))
            .await;
        let user_id = match result {
            SlackApiResult::Success(body) => {
                match serde_json::from_value::<LookupByEmailResponse>(body) {
                    Ok(response) => {
                        let id = response.user.preferred_id();
                        debug!("Slack account {} found for user {}", id, email);
                        Some(id)
                    }
                    Err(err) => {
                        error!("Malformed Slack user lookup for {}: {}", email, err);
                        return None;
                    }
                }
            }
            SlackApiResult::ApplicationError { error, .. } if error == USERS_NOT_FOUND => {
                info!("Slack user ID for email address {} not found.", email);
                None
            }
            SlackApiResult::ApplicationError { status, error } => {
                info!(
                    "Error in retrieving Slack user ID for {}. Status:{}, response:{}",
                    email, status, error
                );
                return None;
            }
            SlackApiResult::HttpError { status, body } => {
                info!(
                    "Error in retrieving Slack user ID for {} status:{} response: {}",
                    email, status, body
                );
                return None;
            }
            SlackApiResult::RateLimited(_) => {
                info!(
                    "Gave up retrieving Slack user ID for {} after {} rate limited attempts.",
                    email,
                    self.retry_policy.max_attempts()
                );
                return None;
            }
            SlackApiResult::Transport(description) => {
                error!("Could not reach Slack to look up {}: {}", email, description);
                return None;
            }
        };
        self.user_ids
            .lock()
            .await
            .insert(email.to_string(), user_id.clone());
        user_id
    }
}
