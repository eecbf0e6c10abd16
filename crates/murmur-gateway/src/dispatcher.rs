use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use murmur_types::events::InboundEvent;
use murmur_types::models::UserId;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Consumer of inbound events. Failures are handled (and reported to the
/// user) inside the handler; nothing propagates back to the dispatcher.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: InboundEvent);
}

/// Fans inbound events out to one FIFO worker per sender.
///
/// Events from the same sender are handled strictly in arrival order;
/// distinct senders run concurrently and never wait on each other.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    handler: Arc<dyn EventHandler>,

    /// sender -> (worker_id, queue)
    queues: Mutex<HashMap<UserId, (Uuid, mpsc::UnboundedSender<InboundEvent>)>>,

    /// How long a worker waits for more events before retiring
    idle_timeout: Duration,

    workers: TaskTracker,

    /// Set under the `queues` lock once shutdown starts
    closing: AtomicBool,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self::with_idle_timeout(handler, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(handler: Arc<dyn EventHandler>, idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                handler,
                queues: Mutex::new(HashMap::new()),
                idle_timeout,
                workers: TaskTracker::new(),
                closing: AtomicBool::new(false),
            }),
        }
    }

    /// Queue an event behind any earlier events from the same sender.
    pub async fn dispatch(&self, event: InboundEvent) {
        let sender = event.sender.id;
        let mut queues = self.inner.queues.lock().await;
        if self.inner.closing.load(Ordering::SeqCst) {
            warn!(user_id = %sender, update_id = event.update_id, "Dispatcher closed, dropping event");
            return;
        }

        let event = match queues.get(&sender) {
            Some((_, tx)) => match tx.send(event) {
                Ok(()) => return,
                // Worker died (handler panic); start a fresh one below.
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let worker_id = Uuid::new_v4();
        // rx is alive, so this cannot fail
        let _ = tx.send(event);
        queues.insert(sender, (worker_id, tx));
        drop(queues);

        debug!(user_id = %sender, %worker_id, "Spawning sender worker");
        let inner = self.inner.clone();
        self.inner.workers.spawn(
            run_worker(inner, sender, worker_id, rx)
                .instrument(info_span!("sender", user_id = %sender)),
        );
    }

    /// Stop accepting events and wait until every queued event has been
    /// handled. Events dispatched afterwards are dropped.
    pub async fn shutdown(&self) {
        let pending = {
            let mut queues = self.inner.queues.lock().await;
            self.inner.closing.store(true, Ordering::SeqCst);
            // Dropping the senders lets each worker drain its queue and exit.
            let pending = queues.len();
            queues.clear();
            pending
        };

        self.inner.workers.close();
        info!(workers = pending, "Waiting for sender workers to finish");
        self.inner.workers.wait().await;
        info!("Sender workers finished");
    }

    /// Number of senders with a live worker.
    pub async fn active_senders(&self) -> usize {
        self.inner.queues.lock().await.len()
    }
}

async fn run_worker(
    inner: Arc<DispatcherInner>,
    sender: UserId,
    worker_id: Uuid,
    mut rx: mpsc::UnboundedReceiver<InboundEvent>,
) {
    loop {
        match tokio::time::timeout(inner.idle_timeout, rx.recv()).await {
            Ok(Some(event)) => inner.handler.handle(event).await,
            Ok(None) => break,
            Err(_) => {
                // Retire under the map lock so no event can be queued between
                // the emptiness check and the removal.
                let mut queues = inner.queues.lock().await;
                match rx.try_recv() {
                    Ok(event) => {
                        drop(queues);
                        inner.handler.handle(event).await;
                    }
                    Err(_) => {
                        if queues.get(&sender).is_some_and(|(id, _)| *id == worker_id) {
                            queues.remove(&sender);
                        }
                        debug!(%worker_id, "Sender worker idle, retiring");
                        break;
                    }
                }
            }
        }
    }
}
