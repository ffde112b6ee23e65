use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;

/// How long a success message stays up.
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_millis(3000);

/// A success message that clears itself after [`SUCCESS_NOTICE_TTL`].
///
/// Each `show` arms its own timer. Timers are not reset by later messages, so
/// an older timer may clear a newer message early. Dropping the notice aborts
/// every pending timer.
#[derive(Debug)]
pub struct TransientNotice {
    tx: Arc<watch::Sender<Option<String>>>,
    timers: Mutex<JoinSet<()>>,
}

impl TransientNotice {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            timers: Mutex::new(JoinSet::new()),
        }
    }

    /// Show `message` and schedule it to clear. Must be called inside a tokio
    /// runtime.
    pub fn show(&self, message: impl Into<String>) {
        self.tx.send_replace(Some(message.into()));

        let tx = Arc::clone(&self.tx);
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        while timers.try_join_next().is_some() {}
        timers.spawn(async move {
            tokio::time::sleep(SUCCESS_NOTICE_TTL).await;
            tx.send_replace(None);
        });
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl Default for TransientNotice {
    fn default() -> Self {
        Self::new()
    }
}
