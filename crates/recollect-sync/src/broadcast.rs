//! `tokio::sync::broadcast`-backed viewer channel.

use recollect_core::viewer::{ViewerChannel, ViewerMessage};
use tokio::sync::broadcast;

/// Viewer channel that fans messages out to every subscribed viewer.
///
/// A viewer counts as connected while at least one receiver is alive.
/// Slow viewers lag and lose old messages rather than blocking the author.
#[derive(Debug, Clone)]
pub struct BroadcastViewer {
    sender: broadcast::Sender<ViewerMessage>,
}

impl BroadcastViewer {
    /// Creates a channel buffering up to `capacity` undelivered messages per
    /// viewer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Attaches a new viewer.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerMessage> {
        self.sender.subscribe()
    }
}

impl ViewerChannel for BroadcastViewer {
    fn is_connected(&self) -> bool {
        self.sender.receiver_count() > 0
    }

    fn post(&self, message: ViewerMessage) {
        // A send error only means every receiver went away in between.
        let _ = self.sender.send(message);
    }
}
