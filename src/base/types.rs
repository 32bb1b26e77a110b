use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A single event as received from the chat transport.
///
/// Only the fields the bot cares about are kept; anything else in the
/// payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl RawEvent {
    /// The conversation this event belongs to: the thread root if there is one,
    /// otherwise the message itself.
    pub fn thread_key(&self) -> Option<&str> {
        self.thread_ts.as_deref().or(self.ts.as_deref())
    }

    /// Whether this is a plain user message (no edit, deletion, join, etc.).
    pub fn is_plain_message(&self) -> bool {
        self.kind == "message" && self.subtype.is_none()
    }
}

/// Routing envelope for a message the bot should answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub channel: String,
    pub user: String,
    pub thread_key: String,
}

/// A message the bot has decided to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The message text with any leading mention removed.
    pub text: String,
    pub metadata: CommandMetadata,
}
