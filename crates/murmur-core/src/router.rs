use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use murmur_gateway::Transport;
use murmur_types::api::{Button, Keyboard};
use murmur_types::models::UserId;

use crate::activation::ActivationState;
use crate::bot::BotSettings;
use crate::commands::{Command, CommandSpec};
use crate::error::CommandError;
use crate::guard::PermissionGuard;
use crate::notices;
use crate::roster;
use crate::store::ModerationStore;

/// What a command sends back to the chat it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text { text: String, keyboard: Keyboard },
    Document { file_name: String, contents: Vec<u8>, caption: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text { text: text.into(), keyboard: Vec::new() }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Reply::Text { text: text.into(), keyboard }
    }
}

/// Checks the caller against the command table, then runs the handler.
pub struct CommandRouter {
    store: ModerationStore,
    activation: Arc<ActivationState>,
    guard: PermissionGuard,
    transport: Arc<dyn Transport>,
    settings: Arc<BotSettings>,
    /// Serializes toggle + announcement so channel notices follow toggle order.
    toggle_lock: Mutex<()>,
}

impl CommandRouter {
    pub fn new(
        store: ModerationStore,
        activation: Arc<ActivationState>,
        guard: PermissionGuard,
        transport: Arc<dyn Transport>,
        settings: Arc<BotSettings>,
    ) -> Self {
        Self {
            store,
            activation,
            guard,
            transport,
            settings,
            toggle_lock: Mutex::new(()),
        }
    }

    /// Execute and deliver the reply. Errors end here as fixed messages.
    pub async fn route(&self, chat_id: i64, sender: UserId, spec: &CommandSpec, args: &[String]) {
        let reply = match self.execute(sender, spec, args).await {
            Ok(reply) => reply,
            Err(err) => Reply::text(render_error(spec, &err)),
        };

        match reply {
            Reply::Text { text, keyboard } => self.send_text(chat_id, &text, &keyboard).await,
            Reply::Document { file_name, contents, caption } => {
                if let Err(e) = self
                    .transport
                    .send_document(chat_id, &file_name, contents, &caption)
                    .await
                {
                    error!(command = spec.name, "Failed to upload document: {}", e);
                    self.send_text(chat_id, spec.failure, &[]).await;
                }
            }
        }
    }

    pub async fn execute(
        &self,
        sender: UserId,
        spec: &CommandSpec,
        args: &[String],
    ) -> Result<Reply, CommandError> {
        self.guard.check(sender, spec.action).await?;

        match spec.command {
            Command::Start => self.start(sender).await,
            Command::Help => Ok(Reply::text(notices::HELP)),
            Command::On => self.toggle(sender, true).await,
            Command::Off => self.toggle(sender, false).await,
            Command::Block => {
                let target = parse_target(spec, args)?;
                self.store.block(target).await?;
                info!(admin = %sender, user_id = %target, "User blocked");
                Ok(Reply::text(format!("✅ User {} blocked successfully!", target)))
            }
            Command::Unblock => {
                let target = parse_target(spec, args)?;
                self.store.unblock(target).await?;
                info!(admin = %sender, user_id = %target, "User unblocked");
                Ok(Reply::text(format!("✅ User {} unblocked successfully!", target)))
            }
            Command::AddAdmin => self.set_admin(sender, spec, args, true).await,
            Command::RemoveAdmin => self.set_admin(sender, spec, args, false).await,
            Command::ListAdmins => self.list_admins().await,
            Command::ExportUsers => self.export_users().await,
        }
    }

    async fn start(&self, sender: UserId) -> Result<Reply, CommandError> {
        self.store.register_user(sender).await?;
        Ok(Reply::with_keyboard(
            notices::WELCOME,
            notices::welcome_keyboard(
                self.settings.creator_url.as_deref(),
                self.settings.developer_url.as_deref(),
            ),
        ))
    }

    async fn toggle(&self, sender: UserId, active: bool) -> Result<Reply, CommandError> {
        let _serial = self.toggle_lock.lock().await;

        let previous = self.activation.set(active);
        if previous == active {
            let text = if active { notices::ALREADY_ACTIVE } else { notices::ALREADY_INACTIVE };
            return Ok(Reply::text(text));
        }

        info!(admin = %sender, active, "Activation changed");

        let announcement = if active { notices::CHANNEL_ACTIVATED } else { notices::CHANNEL_DEACTIVATED };
        if let Err(e) = self.transport.send_to_channel(announcement).await {
            // The toggle itself stands.
            error!(active, "Failed to announce activation change: {}", e);
        }

        Ok(if active {
            Reply::text(notices::ACTIVATED)
        } else {
            Reply::with_keyboard(notices::DEACTIVATED, notices::channel_keyboard(&self.settings.channel))
        })
    }

    async fn set_admin(
        &self,
        sender: UserId,
        spec: &CommandSpec,
        args: &[String],
        is_admin: bool,
    ) -> Result<Reply, CommandError> {
        let target = parse_target(spec, args)?;
        if target == self.store.owner() {
            return Ok(Reply::text(notices::OWNER_IMMUTABLE));
        }

        self.store.set_admin(target, is_admin).await?;
        info!(by = %sender, user_id = %target, is_admin, "Admin flag changed");

        Ok(Reply::text(if is_admin {
            format!("✅ User {} is now an administrator.", target)
        } else {
            format!("✅ User {} is no longer an administrator.", target)
        }))
    }

    async fn list_admins(&self) -> Result<Reply, CommandError> {
        let ids = self.store.list_admins().await?;
        if ids.is_empty() {
            return Ok(Reply::text(notices::NO_ADMINS));
        }

        let entries = roster::resolve_names(self.transport.as_ref(), &ids).await;
        let lines: Vec<String> = entries
            .iter()
            .map(|(id, name)| roster::admin_line(*id, name.as_ref()))
            .collect();

        Ok(Reply::text(format!("{}\n\n{}", notices::ADMINS_HEADER, lines.join("\n"))))
    }

    async fn export_users(&self) -> Result<Reply, CommandError> {
        let ids = self.store.list_users().await?;
        if ids.is_empty() {
            return Ok(Reply::text(notices::NO_USERS));
        }

        let entries = roster::resolve_names(self.transport.as_ref(), &ids).await;
        let caption = format!(
            "Bot user list: {} {} ({})",
            ids.len(),
            if ids.len() == 1 { "user" } else { "users" },
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        );

        Ok(Reply::Document {
            file_name: notices::EXPORT_FILE_NAME.to_string(),
            contents: roster::render_export(&entries).into_bytes(),
            caption,
        })
    }

    async fn send_text(&self, chat_id: i64, text: &str, keyboard: &[Vec<Button>]) {
        if let Err(e) = self.transport.send_to_sender(chat_id, text, keyboard).await {
            warn!(chat_id, "Failed to send reply: {}", e);
        }
    }
}

fn parse_target(spec: &CommandSpec, args: &[String]) -> Result<UserId, CommandError> {
    let usage = spec.usage.unwrap_or(notices::GENERIC_FAILURE);
    args.first()
        .ok_or(CommandError::Input(usage))?
        .parse::<UserId>()
        .map_err(|_| CommandError::Input(usage))
}

fn render_error(spec: &CommandSpec, err: &CommandError) -> String {
    match err {
        CommandError::PermissionDenied { .. } => {
            let text = match spec.command {
                Command::AddAdmin => notices::OWNER_ONLY_PROMOTE,
                Command::RemoveAdmin => notices::OWNER_ONLY_DEMOTE,
                _ => notices::PERMISSION_DENIED,
            };
            text.to_string()
        }
        CommandError::Input(usage) => usage.to_string(),
        // Already logged by the store.
        CommandError::Store(_) => spec.failure.to_string(),
    }
}
