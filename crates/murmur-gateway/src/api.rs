//! Telegram Bot API wire types. Only the fields the bot reads or writes are modelled.

use serde::{Deserialize, Serialize};

use murmur_types::api::{Button, ButtonTarget};
use murmur_types::events::{EventKind, InboundEvent, Sender};
use murmur_types::models::{DisplayName, UserId};

// -- Responses --

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl Update {
    /// Convert to an inbound event. Returns `None` for updates the bot ignores:
    /// bot senders, anonymous channel posts, non-command chatter in groups
    /// and group commands addressed to a different bot.
    pub fn into_event(self, bot_username: Option<&str>) -> Option<InboundEvent> {
        let update_id = self.update_id;

        if let Some(query) = self.callback_query {
            let (chat_id, message_id) = match &query.message {
                Some(m) => (m.chat.id, Some(m.message_id)),
                None => (query.from.id, None),
            };
            let private_chat = query.message.as_ref().is_none_or(|m| m.chat.kind == "private");
            return Some(InboundEvent {
                update_id,
                chat_id,
                private_chat,
                sender: query.from.into_sender(),
                kind: EventKind::Callback {
                    query_id: query.id,
                    data: query.data.unwrap_or_default(),
                    message_id,
                },
            });
        }

        let message = self.message?;
        let from = message.from?;
        if from.is_bot {
            return None;
        }

        let private_chat = message.chat.kind == "private";
        let kind = match message.text.as_deref() {
            Some(text) => EventKind::from_text(text, bot_username),
            None => EventKind::NonText,
        };

        if !private_chat && !matches!(kind, EventKind::Command { .. }) {
            return None;
        }

        Some(InboundEvent {
            update_id,
            chat_id: message.chat.id,
            private_chat,
            sender: from.into_sender(),
            kind,
        })
    }
}

impl User {
    fn into_sender(self) -> Sender {
        Sender {
            id: UserId(self.id),
            first_name: Some(self.first_name).filter(|n| !n.is_empty()),
            username: self.username,
        }
    }
}

impl From<Chat> for DisplayName {
    fn from(chat: Chat) -> Self {
        DisplayName {
            name: chat.first_name.or(chat.title).unwrap_or_default(),
            username: chat.username,
        }
    }
}

// -- Requests --

/// `chat_id` accepts either a numeric id or an `@channel` handle.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChatTarget<'a> {
    Id(i64),
    Handle(&'a str),
}

#[derive(Debug, Serialize)]
pub struct GetUpdates<'a> {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: ChatTarget<'a>,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GetChat {
    pub chat_id: i64,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineKeyboardMarkup {
    /// `None` for an empty keyboard so no `reply_markup` is sent at all.
    pub fn from_rows(rows: &[Vec<Button>]) -> Option<Self> {
        let inline_keyboard: Vec<Vec<InlineKeyboardButton>> = rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.iter().map(InlineKeyboardButton::from).collect())
            .collect();
        (!inline_keyboard.is_empty()).then_some(Self { inline_keyboard })
    }
}

impl From<&Button> for InlineKeyboardButton {
    fn from(button: &Button) -> Self {
        let (url, callback_data) = match &button.target {
            ButtonTarget::Url(url) => (Some(url.clone()), None),
            ButtonTarget::Callback(data) => (None, Some(data.clone())),
        };
        Self { text: button.label.clone(), url, callback_data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn private_text_becomes_text_event() {
        let update = parse(
            r#"{"update_id": 10, "message": {"message_id": 1,
                "from": {"id": 99, "is_bot": false, "first_name": "Ana", "username": "ana"},
                "chat": {"id": 99, "type": "private"}, "text": "hi"}}"#,
        );
        let event = update.into_event(Some("murmur_bot")).unwrap();
        assert_eq!(event.update_id, 10);
        assert_eq!(event.chat_id, 99);
        assert!(event.private_chat);
        assert_eq!(event.sender.id, UserId(99));
        assert_eq!(event.sender.username.as_deref(), Some("ana"));
        assert_eq!(event.kind, EventKind::Text("hi".into()));
    }

    #[test]
    fn media_without_text_is_non_text() {
        let update = parse(
            r#"{"update_id": 11, "message": {"message_id": 2,
                "from": {"id": 99, "first_name": "Ana"},
                "chat": {"id": 99, "type": "private"}, "photo": []}}"#,
        );
        assert_eq!(update.into_event(Some("murmur_bot")).unwrap().kind, EventKind::NonText);
    }

    #[test]
    fn group_chatter_is_ignored_but_group_commands_are_kept() {
        let chatter = parse(
            r#"{"update_id": 12, "message": {"message_id": 3,
                "from": {"id": 5, "first_name": "Bo"},
                "chat": {"id": -100, "type": "supergroup", "title": "g"}, "text": "hey"}}"#,
        );
        assert!(chatter.into_event(Some("murmur_bot")).is_none());

        let command = parse(
            r#"{"update_id": 13, "message": {"message_id": 4,
                "from": {"id": 5, "first_name": "Bo"},
                "chat": {"id": -100, "type": "supergroup", "title": "g"}, "text": "/on@murmur_bot"}}"#,
        );
        let event = command.into_event(Some("murmur_bot")).unwrap();
        assert!(!event.private_chat);
        assert_eq!(event.chat_id, -100);
        assert!(matches!(event.kind, EventKind::Command { ref name, .. } if name == "on"));

        let foreign = parse(
            r#"{"update_id": 16, "message": {"message_id": 6,
                "from": {"id": 5, "first_name": "Bo"},
                "chat": {"id": -100, "type": "supergroup", "title": "g"}, "text": "/block@other_bot 7"}}"#,
        );
        assert!(foreign.into_event(Some("murmur_bot")).is_none());
    }

    #[test]
    fn bot_senders_are_ignored() {
        let update = parse(
            r#"{"update_id": 14, "message": {"message_id": 5,
                "from": {"id": 1, "is_bot": true, "first_name": "other_bot"},
                "chat": {"id": 1, "type": "private"}, "text": "spam"}}"#,
        );
        assert!(update.into_event(Some("murmur_bot")).is_none());
    }

    #[test]
    fn callback_query_carries_message_reference() {
        let update = parse(
            r#"{"update_id": 15, "callback_query": {"id": "cb1",
                "from": {"id": 99, "first_name": "Ana"},
                "message": {"message_id": 77, "chat": {"id": 99, "type": "private"}},
                "data": "help"}}"#,
        );
        let event = update.into_event(Some("murmur_bot")).unwrap();
        assert_eq!(
            event.kind,
            EventKind::Callback { query_id: "cb1".into(), data: "help".into(), message_id: Some(77) }
        );
    }

    #[test]
    fn keyboard_serializes_url_and_callback_buttons() {
        let rows = vec![
            vec![Button::callback("How to use", "help")],
            vec![],
            vec![Button::url("Channel", "https://t.me/murmur")],
        ];
        let markup = InlineKeyboardMarkup::from_rows(&rows).unwrap();
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"inline_keyboard": [
                [{"text": "How to use", "callback_data": "help"}],
                [{"text": "Channel", "url": "https://t.me/murmur"}]
            ]})
        );
        assert!(InlineKeyboardMarkup::from_rows(&[]).is_none());
    }

    #[test]
    fn chat_target_serializes_untagged() {
        assert_eq!(serde_json::to_value(ChatTarget::Id(5)).unwrap(), serde_json::json!(5));
        assert_eq!(
            serde_json::to_value(ChatTarget::Handle("@murmur")).unwrap(),
            serde_json::json!("@murmur")
        );
    }
}
