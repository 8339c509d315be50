use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, Result};

/// Settings for talking to Slack, read from environment variables.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SlackDispatchConfig {
    token: Option<String>,
    http_timeout: Duration,
    max_attempts: u32,
    concurrency: usize,
}

impl SlackDispatchConfig {
    /// Reads the config from the process environment.
    ///
    /// `SLACK_TOKEN` may be absent, in which case user lookups are skipped. The remaining
    /// variables are `SLACK_HTTP_TIMEOUT_SECS`, `SLACK_MAX_ATTEMPTS`, and `SLACK_CONCURRENCY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            token: lookup("SLACK_TOKEN").filter(|t| !t.trim().is_empty()),
            http_timeout: Duration::from_secs(parse_or(&lookup, "SLACK_HTTP_TIMEOUT_SECS", 10)?),
            max_attempts: parse_or(&lookup, "SLACK_MAX_ATTEMPTS", 2)?,
            concurrency: parse_or(&lookup, "SLACK_CONCURRENCY", 4)?,
        })
    }
}

impl SlackDispatchConfig {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}.", key, value)),
        None => Ok(default),
    }
}
