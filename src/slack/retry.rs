use std::{future::Future, time::Duration};

use log::info;

use super::api::SlackApiResult;

/// A trait for waiting out a rate limit.
pub trait Sleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// How many times a call to Slack is made while Slack keeps rate limiting it.
///
/// The delay between attempts always comes from the `Retry-After` header of the response. Every
/// rate limited response is waited out, including the last one, so that the next call to Slack
/// does not run straight into the same limit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` calls in total, with a minimum of 1.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    /// One wait followed by a single resend.
    fn default() -> Self {
        Self::new(2)
    }
}

impl RetryPolicy {
    /// Runs `call` until it returns something other than `SlackApiResult::RateLimited`, or until
    /// the attempts run out.
    pub async fn run<F, Fut>(&self, sleeper: &(impl Sleep + Sync), mut call: F) -> SlackApiResult
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SlackApiResult>,
    {
        let mut attempt = 1;
        loop {
            let result = call().await;
            let SlackApiResult::RateLimited(secs) = result else {
                return result;
            };
            info!("Slack API rate limiting. Waiting {} seconds", secs);
            sleeper.sleep(Duration::from_secs(secs)).await;
            if attempt >= self.max_attempts {
                return result;
            }
            attempt += 1;
        }
    }
}
