use std::sync::Arc;

use async_trait::async_trait;
use tracing::{Instrument, debug, info_span, warn};

use murmur_db::Database;
use murmur_gateway::Transport;
use murmur_gateway::dispatcher::EventHandler;
use murmur_types::events::{EventKind, InboundEvent};
use murmur_types::models::UserId;

use crate::activation::ActivationState;
use crate::commands;
use crate::guard::{PermissionGuard, RoleResolver};
use crate::notices;
use crate::relay::RelayPipeline;
use crate::router::CommandRouter;
use crate::store::ModerationStore;

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub owner: UserId,
    /// Public channel handle, including the leading `@`.
    pub channel: String,
    pub creator_url: Option<String>,
    pub developer_url: Option<String>,
}

/// Entry point for inbound events: commands go to the router, private
/// messages to the relay, button presses are answered here.
pub struct Bot {
    router: Arc<CommandRouter>,
    relay: RelayPipeline,
    transport: Arc<dyn Transport>,
}

impl Bot {
    pub fn new(db: Arc<Database>, transport: Arc<dyn Transport>, settings: BotSettings) -> Self {
        let settings = Arc::new(settings);
        let store = ModerationStore::new(db, settings.owner);
        // Every start begins inactive.
        let activation = Arc::new(ActivationState::new());
        let guard = PermissionGuard::new(RoleResolver::new(store.clone()));

        let relay = RelayPipeline::new(
            store.clone(),
            activation.clone(),
            transport.clone(),
            settings.channel.clone(),
        );
        let router = Arc::new(CommandRouter::new(store, activation, guard, transport.clone(), settings));

        Self::from_parts(router, relay, transport)
    }

    pub fn from_parts(router: Arc<CommandRouter>, relay: RelayPipeline, transport: Arc<dyn Transport>) -> Self {
        Self { router, relay, transport }
    }

    pub async fn process(&self, event: InboundEvent) {
        let sender = event.sender.id;
        let chat_id = event.chat_id;

        match event.kind {
            EventKind::Command { name, args, raw } => match commands::lookup(&name) {
                Some(spec) => self.router.route(chat_id, sender, spec, &args).await,
                // Unknown commands are ordinary text as far as the relay is concerned.
                None if event.private_chat => {
                    self.relay.submit(chat_id, sender, Some(&raw)).await;
                }
                None => debug!(command = %name, "Ignoring unknown command outside private chat"),
            },
            EventKind::Text(text) if event.private_chat => {
                self.relay.submit(chat_id, sender, Some(&text)).await;
            }
            EventKind::NonText if event.private_chat => {
                self.relay.submit(chat_id, sender, None).await;
            }
            EventKind::Text(_) | EventKind::NonText => {
                debug!("Ignoring non-command message outside private chat");
            }
            EventKind::Callback { query_id, data, message_id } => {
                self.handle_callback(chat_id, &query_id, &data, message_id).await;
            }
        }
    }

    async fn handle_callback(&self, chat_id: i64, query_id: &str, data: &str, message_id: Option<i64>) {
        match (data, message_id) {
            (notices::HELP_CALLBACK, Some(message_id)) => {
                if let Err(e) = self.transport.edit_message(chat_id, message_id, notices::HELP).await {
                    warn!("Failed to show help: {}", e);
                }
            }
            (notices::HELP_CALLBACK, None) => {
                if let Err(e) = self.transport.send_to_sender(chat_id, notices::HELP, &[]).await {
                    warn!("Failed to show help: {}", e);
                }
            }
            _ => debug!(data, "Ignoring unknown callback"),
        }

        if let Err(e) = self.transport.answer_callback(query_id).await {
            warn!("Failed to answer callback: {}", e);
        }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn handle(&self, event: InboundEvent) {
        let span = info_span!("update", update_id = event.update_id);
        self.process(event).instrument(span).await
    }
}
