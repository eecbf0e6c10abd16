use std::sync::Arc;

use tracing::{debug, error, warn};

use murmur_db::StoreError;
use murmur_gateway::Transport;
use murmur_types::models::UserId;

use crate::activation::ActivationState;
use crate::notices;
use crate::store::ModerationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NonText,
    Blocked,
    Inactive,
    DeliveryFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Acknowledged,
    Rejected(RejectReason),
}

/// Wraps the text in the channel envelope. Nothing about the sender goes in.
pub fn format_envelope(text: &str) -> String {
    format!("{}\n\n{}", notices::ENVELOPE_HEADER, text)
}

/// Block check, activation gate, format, forward, acknowledge.
///
/// Moderation state is only read here; no lock is held while the forward
/// is in flight. Sender identity stays out of relay logs.
#[derive(Clone)]
pub struct RelayPipeline {
    store: ModerationStore,
    activation: Arc<ActivationState>,
    transport: Arc<dyn Transport>,
    channel: String,
}

impl RelayPipeline {
    pub fn new(
        store: ModerationStore,
        activation: Arc<ActivationState>,
        transport: Arc<dyn Transport>,
        channel: impl Into<String>,
    ) -> Self {
        Self { store, activation, transport, channel: channel.into() }
    }

    /// Runs the pipeline without replying to the sender. `text` is `None`
    /// for media and other non-text input.
    pub async fn relay(&self, sender: UserId, text: Option<&str>) -> Result<RelayOutcome, StoreError> {
        let Some(text) = text else {
            return Ok(RelayOutcome::Rejected(RejectReason::NonText));
        };

        if self.store.is_blocked(sender).await? {
            return Ok(RelayOutcome::Rejected(RejectReason::Blocked));
        }

        if !self.activation.is_active() {
            return Ok(RelayOutcome::Rejected(RejectReason::Inactive));
        }

        let envelope = format_envelope(text);
        match self.transport.send_to_channel(&envelope).await {
            Ok(()) => {
                debug!("Relayed anonymous message");
                Ok(RelayOutcome::Acknowledged)
            }
            Err(e) => {
                error!("Failed to forward anonymous message: {}", e);
                Ok(RelayOutcome::Rejected(RejectReason::DeliveryFailed))
            }
        }
    }

    /// Runs the pipeline and tells the sender how it went.
    pub async fn submit(&self, chat_id: i64, sender: UserId, text: Option<&str>) -> Option<RelayOutcome> {
        let outcome = match self.relay(sender, text).await {
            Ok(outcome) => outcome,
            Err(_) => {
                self.reply(chat_id, notices::GENERIC_FAILURE, false).await;
                return None;
            }
        };

        let (notice, with_channel_button) = match outcome {
            RelayOutcome::Acknowledged => (notices::RELAY_SENT, false),
            RelayOutcome::Rejected(RejectReason::NonText) => (notices::RELAY_TEXT_ONLY, false),
            RelayOutcome::Rejected(RejectReason::Blocked) => (notices::RELAY_BLOCKED, false),
            RelayOutcome::Rejected(RejectReason::Inactive) => (notices::RELAY_INACTIVE, true),
            RelayOutcome::Rejected(RejectReason::DeliveryFailed) => (notices::RELAY_FAILED, false),
        };
        self.reply(chat_id, notice, with_channel_button).await;
        Some(outcome)
    }

    async fn reply(&self, chat_id: i64, text: &str, with_channel_button: bool) {
        let keyboard = if with_channel_button {
            notices::channel_keyboard(&self.channel)
        } else {
            Vec::new()
        };
        if let Err(e) = self.transport.send_to_sender(chat_id, text, &keyboard).await {
            warn!("Failed to send relay notice: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CHANNEL, Harness};

    #[test]
    fn envelope_is_header_plus_verbatim_text() {
        assert_eq!(format_envelope("hi *there*"), "📢 New anonymous message:\n\nhi *there*");
    }

    #[tokio::test]
    async fn blocked_sender_is_rejected_regardless_of_activation() {
        let h = Harness::new();
        h.store.block(UserId(7)).await.unwrap();

        assert_eq!(
            h.relay.relay(UserId(7), Some("hello")).await.unwrap(),
            RelayOutcome::Rejected(RejectReason::Blocked)
        );
        h.activation.activate();
        assert_eq!(
            h.relay.relay(UserId(7), Some("hello")).await.unwrap(),
            RelayOutcome::Rejected(RejectReason::Blocked)
        );
        assert!(h.transport.channel_posts().is_empty());
    }

    #[tokio::test]
    async fn inactive_rejects_without_forwarding() {
        let h = Harness::new();
        let outcome = h.relay.submit(99, UserId(99), Some("hi")).await;

        assert_eq!(outcome, Some(RelayOutcome::Rejected(RejectReason::Inactive)));
        assert!(h.transport.channel_posts().is_empty());

        let replies = h.transport.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, notices::RELAY_INACTIVE);
        assert_eq!(replies[0].keyboard, notices::channel_keyboard(CHANNEL));
    }

    #[tokio::test]
    async fn non_text_is_rejected_before_any_check() {
        let h = Harness::new();
        h.store.block(UserId(7)).await.unwrap();
        h.activation.activate();

        let outcome = h.relay.submit(7, UserId(7), None).await;
        assert_eq!(outcome, Some(RelayOutcome::Rejected(RejectReason::NonText)));
        assert_eq!(h.transport.replies()[0].text, notices::RELAY_TEXT_ONLY);
        assert!(h.transport.channel_posts().is_empty());
    }

    #[tokio::test]
    async fn active_relay_forwards_anonymously_and_acknowledges() {
        let h = Harness::new();
        h.activation.activate();

        let outcome = h.relay.submit(99, UserId(99), Some("hi")).await;
        assert_eq!(outcome, Some(RelayOutcome::Acknowledged));

        let posts = h.transport.channel_posts();
        assert_eq!(posts, vec![format_envelope("hi")]);
        assert!(!posts[0].contains("99"));
        assert_eq!(h.transport.replies()[0].text, notices::RELAY_SENT);
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_and_not_retried() {
        let h = Harness::new();
        h.activation.activate();
        h.transport.fail_channel(true);

        let outcome = h.relay.submit(99, UserId(99), Some("hi")).await;
        assert_eq!(outcome, Some(RelayOutcome::Rejected(RejectReason::DeliveryFailed)));
        assert_eq!(h.transport.channel_attempts(), 1);
        assert_eq!(h.transport.replies()[0].text, notices::RELAY_FAILED);
    }

    #[tokio::test]
    async fn block_committed_before_check_denies_relay() {
        let h = Harness::new();
        h.activation.activate();

        assert_eq!(h.relay.relay(UserId(5), Some("a")).await.unwrap(), RelayOutcome::Acknowledged);
        h.store.block(UserId(5)).await.unwrap();
        assert_eq!(
            h.relay.relay(UserId(5), Some("b")).await.unwrap(),
            RelayOutcome::Rejected(RejectReason::Blocked)
        );
        h.store.unblock(UserId(5)).await.unwrap();
        assert_eq!(h.relay.relay(UserId(5), Some("c")).await.unwrap(), RelayOutcome::Acknowledged);
    }
}
