//! Test viewer — records every message posted to it.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use recollect_core::viewer::{ViewerChannel, ViewerMessage};

/// A viewer channel that records posted messages. Connection state can be
/// flipped mid-test to simulate the viewer window closing.
#[derive(Debug)]
pub struct RecordingViewer {
    connected: AtomicBool,
    messages: Mutex<Vec<ViewerMessage>>,
}

impl RecordingViewer {
    /// A viewer that is open.
    #[must_use]
    pub fn connected() -> Self {
        Self {
            connected: AtomicBool::new(true),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// A viewer that was never opened.
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            connected: AtomicBool::new(false),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Opens or closes the viewer.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Returns a snapshot of all posted messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn messages(&self) -> Vec<ViewerMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Returns the most recent `syncAll` message, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn last_sync_all(&self) -> Option<ViewerMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| matches!(m, ViewerMessage::SyncAll { .. }))
            .cloned()
    }

    /// Forgets everything recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl ViewerChannel for RecordingViewer {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn post(&self, message: ViewerMessage) {
        self.messages.lock().unwrap().push(message);
    }
}
