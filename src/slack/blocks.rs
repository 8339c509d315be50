use serde::{ser::SerializeStruct, Serialize};

/// A section block.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SlackSection {
    #[serde(rename = "type")]
    _type: &'static str,
    text: SlackText,
}

impl SlackSection {
    /// A convenience constructor to create a section from markdown.
    pub fn from_markdown(markdown: &str) -> Self {
        Self {
            _type: "section",
            text: SlackText::markdown(markdown),
        }
    }
}

/// A header block.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SlackHeader {
    #[serde(rename = "type")]
    _type: &'static str,
    text: SlackText,
}

impl SlackHeader {
    /// Slack rejects headers longer than this many characters.
    const MAX_LENGTH: usize = 150;

    pub fn new(text: &str) -> Self {
        let text = if text.chars().count() > Self::MAX_LENGTH {
            let mut truncated = text.chars().take(Self::MAX_LENGTH - 1).collect::<String>();
            truncated.push('…');
            truncated
        } else {
            text.to_string()
        };
        Self {
            _type: "header",
            text: SlackText::plain(&text),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct SlackDivider {
    #[serde(rename = "type")]
    _type: &'static str,
}

/// A divider block.
#[allow(nonstandard_style)]
pub const SlackDivider: SlackDivider = SlackDivider { _type: "divider" };

/// Text for use in a block.
#[derive(Debug, PartialEq, Eq)]
pub struct SlackText {
    _type: &'static str,
    text: String,
}

impl SlackText {
    pub fn markdown(markdown: &str) -> Self {
        Self {
            _type: "mrkdwn",
            text: markdown.to_string(),
        }
    }

    pub fn plain(text: &str) -> Self {
        Self {
            _type: "plain_text",
            text: text.to_string(),
        }
    }

    fn is_markdown(&self) -> bool {
        self._type == "mrkdwn"
    }
}

impl Serialize for SlackText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state =
            serializer.serialize_struct("SlackText", if self.is_markdown() { 2 } else { 3 })?;
        if !self.is_markdown() {
            state.serialize_field("emoji", &true)?
        }
        state.serialize_field("text", &self.text)?;
        state.serialize_field("type", &self._type)?;
        state.end()
    }
}
