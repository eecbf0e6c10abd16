use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use murmur_db::Database;
use murmur_gateway::{Transport, TransportError};
use murmur_types::api::{Button, Keyboard};
use murmur_types::models::{DisplayName, UserId};

use crate::activation::ActivationState;
use crate::bot::{Bot, BotSettings};
use crate::guard::{PermissionGuard, RoleResolver};
use crate::relay::RelayPipeline;
use crate::router::CommandRouter;
use crate::store::ModerationStore;

pub const OWNER: UserId = UserId(1);
pub const CHANNEL: &str = "@murmur_test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Keyboard,
}

/// In-process transport that records everything it is asked to send.
#[derive(Default)]
pub struct RecordingTransport {
    channel: Mutex<Vec<String>>,
    channel_attempts: AtomicUsize,
    replies: Mutex<Vec<SentReply>>,
    documents: Mutex<Vec<(i64, String, Vec<u8>)>>,
    edits: Mutex<Vec<(i64, i64, String)>>,
    answered: Mutex<Vec<String>>,
    names: Mutex<HashMap<UserId, DisplayName>>,
    fail_channel: AtomicBool,
    fail_documents: AtomicBool,
}

fn refused(method: &'static str) -> TransportError {
    TransportError::Api { method, code: Some(400), description: "refused by test".into() }
}

impl RecordingTransport {
    pub fn fail_channel(&self, fail: bool) {
        self.fail_channel.store(fail, Ordering::SeqCst);
    }

    pub fn fail_documents(&self, fail: bool) {
        self.fail_documents.store(fail, Ordering::SeqCst);
    }

    pub fn set_name(&self, id: UserId, name: DisplayName) {
        self.names.lock().unwrap().insert(id, name);
    }

    pub fn channel_posts(&self) -> Vec<String> {
        self.channel.lock().unwrap().clone()
    }

    pub fn channel_attempts(&self) -> usize {
        self.channel_attempts.load(Ordering::SeqCst)
    }

    pub fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn replies_to(&self, chat_id: i64) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter(|r| r.chat_id == chat_id)
            .map(|r| r.text)
            .collect()
    }

    pub fn documents(&self) -> Vec<(i64, String, Vec<u8>)> {
        self.documents.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<(i64, i64, String)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_to_channel(&self, text: &str) -> Result<(), TransportError> {
        self.channel_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_channel.load(Ordering::SeqCst) {
            return Err(refused("sendMessage"));
        }
        self.channel.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_to_sender(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<(), TransportError> {
        self.replies.lock().unwrap().push(SentReply {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.to_vec(),
        });
        Ok(())
    }

    async fn resolve_display_name(&self, id: UserId) -> Result<DisplayName, TransportError> {
        self.names.lock().unwrap().get(&id).cloned().ok_or_else(|| refused("getChat"))
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        contents: Vec<u8>,
        _caption: &str,
    ) -> Result<(), TransportError> {
        if self.fail_documents.load(Ordering::SeqCst) {
            return Err(refused("sendDocument"));
        }
        self.documents.lock().unwrap().push((chat_id, file_name.to_string(), contents));
        Ok(())
    }

    async fn edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> Result<(), TransportError> {
        self.edits.lock().unwrap().push((chat_id, message_id, text.to_string()));
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), TransportError> {
        self.answered.lock().unwrap().push(query_id.to_string());
        Ok(())
    }
}

/// Fully wired bot over an in-memory database and a recording transport.
pub struct Harness {
    pub bot: Bot,
    pub router: Arc<CommandRouter>,
    pub relay: RelayPipeline,
    pub store: ModerationStore,
    pub activation: Arc<ActivationState>,
    pub transport: Arc<RecordingTransport>,
}

impl Harness {
    pub fn new() -> Self {
        let settings = Arc::new(BotSettings {
            owner: OWNER,
            channel: CHANNEL.to_string(),
            creator_url: None,
            developer_url: None,
        });
        let store = ModerationStore::new(Arc::new(Database::open_in_memory().unwrap()), OWNER);
        let activation = Arc::new(ActivationState::new());
        let transport = Arc::new(RecordingTransport::default());
        let dyn_transport: Arc<dyn Transport> = transport.clone();

        let guard = PermissionGuard::new(RoleResolver::new(store.clone()));
        let router = Arc::new(CommandRouter::new(
            store.clone(),
            activation.clone(),
            guard,
            dyn_transport.clone(),
            settings.clone(),
        ));
        let relay = RelayPipeline::new(store.clone(), activation.clone(), dyn_transport.clone(), CHANNEL);
        let bot = Bot::from_parts(router.clone(), relay.clone(), dyn_transport);

        Self { bot, router, relay, store, activation, transport }
    }
}
