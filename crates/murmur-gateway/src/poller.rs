use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::telegram::TelegramClient;

const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Long-polls `getUpdates` and feeds every usable update into the dispatcher.
pub struct Poller {
    client: TelegramClient,
    dispatcher: Dispatcher,
    timeout_secs: u64,
    /// Group commands suffixed with another bot's name are ignored.
    bot_username: Option<String>,
}

impl Poller {
    pub fn new(
        client: TelegramClient,
        dispatcher: Dispatcher,
        timeout_secs: u64,
        bot_username: Option<String>,
    ) -> Self {
        Self { client, dispatcher, timeout_secs, bot_username }
    }

    /// Runs until `shutdown` resolves. Offsets are acknowledged as soon as an
    /// update is queued, so a crash may drop in-flight events but never
    /// replays handled ones. Call [`Dispatcher::shutdown`] afterwards to
    /// drain what is already queued.
    pub async fn run<S>(self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset: i64 = 0;

        info!(timeout_secs = self.timeout_secs, "Polling for updates");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                result = self.client.get_updates(offset, self.timeout_secs) => match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            let update_id = update.update_id;
                            match update.into_event(self.bot_username.as_deref()) {
                                Some(event) => self.dispatcher.dispatch(event).await,
                                None => debug!(update_id, "Ignoring update"),
                            }
                        }
                    }
                    Err(e) => {
                        warn!("getUpdates failed: {}", e);
                        tokio::select! {
                            _ = &mut shutdown => break,
                            _ = tokio::time::sleep(ERROR_BACKOFF) => {}
                        }
                    }
                },
            }
        }

        info!("Update polling stopped");
    }
}
