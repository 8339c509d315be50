use std::collections::HashMap;

use tokio::sync::Mutex;

use super::{
    api::{SlackApiResult, SlackHttpRequest, SlackTransport},
    retry::{RetryPolicy, Sleep, TokioSleep},
};

/// Everything needed to talk to the Slack Web API and incoming webhooks.
///
/// Lookups and message sends live in `users` and `dispatch` respectively.
pub struct SlackClient<T, S = TokioSleep> {
    pub(crate) transport: T,
    pub(super) token: Option<String>,
    pub(super) retry_policy: RetryPolicy,
    pub(super) sleeper: S,
    pub(super) concurrency: usize,
    /// Lookups by email, with `None` for emails Slack does not know about.
    pub(super) user_ids: Mutex<HashMap<String, Option<String>>>,
}

impl<T> SlackClient<T> {
    pub fn new(transport: T, token: Option<String>) -> Self {
        Self::with_sleeper(transport, token, TokioSleep)
    }
}

impl<T, S: Sleep> SlackClient<T, S> {
    pub fn with_sleeper(transport: T, token: Option<String>, sleeper: S) -> Self {
        Self {
            transport,
            token: token.filter(|t| !t.trim().is_empty()),
            retry_policy: RetryPolicy::default(),
            sleeper,
            concurrency: 4,
            user_ids: Mutex::new(HashMap::new()),
        }
    }

    pub fn retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self {
            retry_policy,
            ..self
        }
    }

    /// Sets how many requests may be in flight at once, with a minimum of 1.
    pub fn concurrency(self, concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            ..self
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl<T: SlackTransport, S> SlackClient<T, S> {
    /// Makes a single request and classifies the response.
    pub(super) async fn call(&self, request: &SlackHttpRequest) -> SlackApiResult {
        match self.transport.send_request(request).await {
            Ok(response) => SlackApiResult::from_response(&response),
            Err(error) => SlackApiResult::Transport(format!("{:#}", error)),
        }
    }
}
