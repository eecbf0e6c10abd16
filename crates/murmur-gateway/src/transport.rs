use async_trait::async_trait;

use murmur_types::api::Button;
use murmur_types::models::{DisplayName, UserId};

use crate::error::TransportError;

/// Outbound side of the chat platform.
///
/// Every call is bounded by the implementation's request timeout and
/// surfaces failure instead of hanging.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Post to the single configured public channel.
    async fn send_to_channel(&self, text: &str) -> Result<(), TransportError>;

    /// Reply in a chat, optionally with rows of inline buttons.
    async fn send_to_sender(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<(), TransportError>;

    async fn resolve_display_name(&self, id: UserId) -> Result<DisplayName, TransportError>;

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        contents: Vec<u8>,
        caption: &str,
    ) -> Result<(), TransportError>;

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError>;

    /// Stop the client-side spinner on a pressed button.
    async fn answer_callback(&self, query_id: &str) -> Result<(), TransportError>;
}
