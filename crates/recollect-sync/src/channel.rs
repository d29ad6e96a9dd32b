//! Guarded sender over a `ViewerChannel`.

use std::fmt;
use std::sync::Arc;

use recollect_core::image::ImageRef;
use recollect_core::viewer::{ViewerChannel, ViewerMessage};
use tracing::debug;

/// Renders keyword labels as viewer tags: every label of every set, in order,
/// prefixed with `#`.
pub fn hashtags<'a, I>(sets: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    sets.into_iter()
        .flatten()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(|label| format!("#{}", label.trim_start_matches('#')))
        .collect()
}

/// One-way broadcast from the authoring session to the viewer.
///
/// Every send checks liveness first; with no viewer attached each method is
/// a logged no-op and never an error.
#[derive(Clone)]
pub struct SyncChannel {
    viewer: Arc<dyn ViewerChannel>,
}

impl SyncChannel {
    /// Wraps a viewer port.
    #[must_use]
    pub fn new(viewer: Arc<dyn ViewerChannel>) -> Self {
        Self { viewer }
    }

    /// Whether a viewer is listening right now.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.viewer.is_connected()
    }

    fn send(&self, message: ViewerMessage) {
        if !self.viewer.is_connected() {
            debug!(kind = message.kind(), "viewer not connected, dropping message");
            return;
        }
        debug!(kind = message.kind(), "posting viewer message");
        self.viewer.post(message);
    }

    /// Shows or hides the viewer's loading overlay.
    pub fn toggle_loading(&self, value: bool) {
        self.send(ViewerMessage::ToggleLoading { value });
    }

    /// Pushes the complete scene presentation.
    pub fn sync_all(
        &self,
        narrative: &str,
        question: Option<&str>,
        parameters: Vec<String>,
        panorama: Option<&ImageRef>,
        image: Option<&ImageRef>,
    ) {
        self.send(ViewerMessage::SyncAll {
            narrative: narrative.to_owned(),
            question: question.unwrap_or_default().to_owned(),
            parameters,
            panorama_src: panorama.map(ImageRef::data_uri),
            image_src: image.map(ImageRef::data_uri),
        });
    }

    /// Pushes only the selected question.
    pub fn sync_question(&self, question: &str) {
        self.send(ViewerMessage::SyncQuestion {
            question: question.to_owned(),
        });
    }

    /// Shows the loading overlay and returns a guard that hides it again
    /// unless the step completes with [`LoadingGuard::complete`].
    #[must_use]
    pub fn begin_loading(&self) -> LoadingGuard {
        self.toggle_loading(true);
        LoadingGuard {
            channel: self.clone(),
            armed: true,
        }
    }
}

impl fmt::Debug for SyncChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncChannel")
            .field("connected", &self.viewer.is_connected())
            .finish()
    }
}

/// Hides the viewer's loading overlay when dropped, so a failed or abandoned
/// step never leaves the viewer spinning.
#[derive(Debug)]
pub struct LoadingGuard {
    channel: SyncChannel,
    armed: bool,
}

impl LoadingGuard {
    /// Marks the step successful. The closing `syncAll` already clears the
    /// overlay on the viewer side, so no `toggleLoading(false)` is sent.
    pub fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.armed {
            self.channel.toggle_loading(false);
        }
    }
}
