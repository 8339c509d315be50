use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use strum_macros::IntoStaticStr;

use crate::{alert::message::AlertMessage, utils::dedup::DedupIterator};

/// The prefix of a destination that names a resource tag holding the channel.
pub const TAG_PREFIX: &str = "slack://tag/";

/// The prefix of every Slack incoming webhook URL.
pub const WEBHOOK_PREFIX: &str = "https://hooks.slack.com/";

const SLACK_SCHEME: &str = "slack://";
const SLACK_CHANNEL_PREFIX: &str = "slack://#";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^[A-Za-z0-9._%+\-']+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
        .build()
        .expect("Failed to compile email regex.")
});

/// A place that an alert can be delivered to in Slack.
#[derive(Debug, PartialEq, Eq, Hash, Clone, IntoStaticStr)]
pub enum SlackDestination {
    /// A channel named directly.
    #[strum(serialize = "channel")]
    Channel(String),
    /// The name of a resource tag whose value is the channel.
    #[strum(serialize = "tag")]
    Tag(String),
    /// A full incoming webhook URL.
    #[strum(serialize = "webhook")]
    Webhook(String),
    /// The email of a user who should receive a direct message.
    #[strum(serialize = "user")]
    User(String),
}

impl SlackDestination {
    /// Classifies a raw destination specifier.
    ///
    /// Tag references win over webhooks, webhooks over emails, and anything else is a channel.
    pub fn classify(specifier: &str) -> Self {
        if let Some(tag_name) = specifier.strip_prefix(TAG_PREFIX) {
            return Self::Tag(tag_name.to_string());
        }
        if specifier.starts_with(WEBHOOK_PREFIX) {
            return Self::Webhook(specifier.to_string());
        }
        let unprefixed = specifier.strip_prefix(SLACK_SCHEME).unwrap_or(specifier);
        if EMAIL_REGEX.is_match(unprefixed) {
            return Self::User(unprefixed.to_string());
        }
        let channel = specifier
            .strip_prefix(SLACK_CHANNEL_PREFIX)
            .unwrap_or(unprefixed);
        Self::Channel(channel.to_string())
    }

    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns true if nothing is left to address once the prefixes are stripped, as with
    /// `slack://#` or `slack://tag/`.
    fn is_blank(&self) -> bool {
        match self {
            Self::Channel(name) | Self::Tag(name) => name.trim().is_empty(),
            Self::Webhook(_) | Self::User(_) => false,
        }
    }
}

/// Returns the distinct destinations of an alert.
///
/// The notify action's `to` list is merged with the `to` list of every policy action, in order,
/// and specifiers that name nothing are dropped.
pub fn alert_destinations(message: &AlertMessage) -> Vec<SlackDestination> {
    message
        .raw_destinations()
        .map(str::trim)
        .map(SlackDestination::classify)
        .filter(|d| !d.is_blank())
        .dedup()
        .collect()
}
