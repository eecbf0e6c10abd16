use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use murmur_types::api::Button;
use murmur_types::models::{DisplayName, UserId};

use crate::api::{
    AnswerCallbackQuery, ApiResponse, Chat, ChatTarget, EditMessageText, GetChat, GetUpdates,
    InlineKeyboardMarkup, SendMessage, Update, User,
};
use crate::error::TransportError;
use crate::transport::Transport;

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Bot API client. Deliberately not `Debug`: the endpoint embeds the bot token.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    endpoint: String,
    channel: String,
}

impl TelegramClient {
    pub fn new(
        api_url: &str,
        token: &str,
        channel: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout)
            .build()
            .map_err(TransportError::http)?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            channel: channel.into(),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Identity of the bot account; used as a startup credential check.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-poll for updates after `offset`. The HTTP timeout is stretched
    /// past the server-side poll timeout so an idle poll is not an error.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TransportError> {
        let params = GetUpdates { offset, timeout: timeout_secs, allowed_updates: ALLOWED_UPDATES };
        self.call("getUpdates", &params, Some(Duration::from_secs(timeout_secs + 10)))
            .await
    }

    async fn call<P, R>(
        &self,
        method: &'static str,
        params: &P,
        timeout: Option<Duration>,
    ) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(TransportError::http)?;
        let body: ApiResponse<R> = response.json().await.map_err(TransportError::http)?;
        unwrap_response(method, body)
    }
}

fn unwrap_response<R>(method: &'static str, body: ApiResponse<R>) -> Result<R, TransportError> {
    if !body.ok {
        return Err(TransportError::Api {
            method,
            code: body.error_code,
            description: body.description.unwrap_or_default(),
        });
    }
    body.result.ok_or(TransportError::EmptyResult(method))
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_to_channel(&self, text: &str) -> Result<(), TransportError> {
        let params = SendMessage {
            chat_id: ChatTarget::Handle(&self.channel),
            text,
            reply_markup: None,
        };
        let _: serde_json::Value = self.call("sendMessage", &params, None).await?;
        debug!(channel = %self.channel, "Posted to channel");
        Ok(())
    }

    async fn send_to_sender(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<(), TransportError> {
        let params = SendMessage {
            chat_id: ChatTarget::Id(chat_id),
            text,
            reply_markup: InlineKeyboardMarkup::from_rows(keyboard),
        };
        let _: serde_json::Value = self.call("sendMessage", &params, None).await?;
        Ok(())
    }

    async fn resolve_display_name(&self, id: UserId) -> Result<DisplayName, TransportError> {
        let chat: Chat = self.call("getChat", &GetChat { chat_id: id.0 }, None).await?;
        Ok(chat.into())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        contents: Vec<u8>,
        caption: &str,
    ) -> Result<(), TransportError> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/plain; charset=utf-8")
            .map_err(TransportError::http)?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let response = self
            .http
            .post(format!("{}/sendDocument", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::http)?;
        let body: ApiResponse<serde_json::Value> =
            response.json().await.map_err(TransportError::http)?;
        unwrap_response("sendDocument", body)?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        let params = EditMessageText { chat_id, message_id, text };
        let _: serde_json::Value = self.call("editMessageText", &params, None).await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), TransportError> {
        let params = AnswerCallbackQuery { callback_query_id: query_id };
        let _: bool = self.call("answerCallbackQuery", &params, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_method_and_description() {
        let body: ApiResponse<serde_json::Value> = serde_json::from_str(
            r#"{"ok": false, "error_code": 403, "description": "Forbidden: bot was blocked by the user"}"#,
        )
        .unwrap();
        match unwrap_response("sendMessage", body) {
            Err(TransportError::Api { method, code, description }) => {
                assert_eq!(method, "sendMessage");
                assert_eq!(code, Some(403));
                assert!(description.contains("blocked"));
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn ok_without_result_is_an_error() {
        let body: ApiResponse<serde_json::Value> = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(matches!(
            unwrap_response("getChat", body),
            Err(TransportError::EmptyResult("getChat"))
        ));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let client = TelegramClient::new(
            "https://api.telegram.org/",
            "123:abc",
            "@murmur",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint, "https://api.telegram.org/bot123:abc");
        assert_eq!(client.channel(), "@murmur");
    }
}
