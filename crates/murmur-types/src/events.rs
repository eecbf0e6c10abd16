use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// The person behind an inbound event, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: UserId,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

/// One unit of inbound work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub update_id: i64,
    /// Chat replies go to. Equals the sender id in private chats.
    pub chat_id: i64,
    pub private_chat: bool,
    pub sender: Sender,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventKind {
    /// `/name arg1 arg2`, with any `@botname` suffix already stripped.
    /// `raw` keeps the original text for commands the bot does not know.
    Command {
        name: String,
        args: Vec<String>,
        raw: String,
    },

    /// Plain text message
    Text(String),

    /// Photo, sticker, voice note or anything else without text
    NonText,

    /// Inline keyboard button press
    Callback {
        query_id: String,
        data: String,
        message_id: Option<i64>,
    },
}

impl EventKind {
    /// Classify message text: anything starting with `/` followed by a word is a command.
    ///
    /// A `/name@bot` suffix must match `bot_username` (case-insensitive);
    /// commands addressed to another bot are plain text. With no known
    /// username every suffix is accepted.
    pub fn from_text(text: &str, bot_username: Option<&str>) -> Self {
        let trimmed = text.trim_start();
        if let Some(rest) = trimmed.strip_prefix('/').filter(|r| !r.starts_with(char::is_whitespace)) {
            let mut parts = rest.split_whitespace();
            if let Some(head) = parts.next() {
                let (name, addressee) = match head.split_once('@') {
                    Some((name, addressee)) => (name, Some(addressee)),
                    None => (head, None),
                };
                let for_us = match (addressee, bot_username) {
                    (Some(addressee), Some(me)) => addressee.eq_ignore_ascii_case(me),
                    _ => true,
                };
                if for_us && !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return EventKind::Command {
                        name: name.to_ascii_lowercase(),
                        args: parts.map(str::to_string).collect(),
                        raw: text.to_string(),
                    };
                }
            }
        }
        EventKind::Text(text.to_string())
    }
}
