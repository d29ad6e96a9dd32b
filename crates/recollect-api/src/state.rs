//! Shared application state.

use std::sync::Arc;

use recollect_core::clock::Clock;
use recollect_core::error::DomainError;
use recollect_core::generation::{ImageGenerator, TextGenerator};
use recollect_interview::application::command_handlers::{self, Collaborators};
use recollect_interview::domain::aggregates::InterviewSession;
use recollect_interview::domain::commands::StartSession;
use recollect_interview::domain::profile::RespondentProfile;
use recollect_sync::{BroadcastViewer, SyncChannel};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The one authoring session this server hosts.
    pub session: Arc<Mutex<InterviewSession>>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Text generation backend.
    pub text: Arc<dyn TextGenerator>,
    /// Image generation backend.
    pub image: Arc<dyn ImageGenerator>,
    /// Viewer fan-out; websocket clients subscribe here.
    pub viewer: BroadcastViewer,
    /// Guarded sender over `viewer`.
    pub sync: SyncChannel,
    /// Narrative language.
    pub language: Arc<str>,
}

impl AppState {
    /// Create new application state with a fresh session for `profile`.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        viewer_buffer: usize,
        language: &str,
        profile: RespondentProfile,
    ) -> Self {
        let viewer = BroadcastViewer::new(viewer_buffer);
        let sync = SyncChannel::new(Arc::new(viewer.clone()));
        let session = command_handlers::handle_start_session(
            &StartSession {
                correlation_id: Uuid::new_v4(),
                profile,
                planned_questions: Vec::new(),
            },
            language,
        );
        Self {
            session: Arc::new(Mutex::new(session)),
            clock,
            text,
            image,
            viewer,
            sync,
            language: Arc::from(language),
        }
    }

    /// Takes the session for a mutating command.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Busy` while another command holds it.
    pub fn try_session(&self) -> Result<MutexGuard<'_, InterviewSession>, DomainError> {
        self.session.try_lock().map_err(|_| DomainError::Busy)
    }

    /// The collaborators bundle handed to command handlers.
    #[must_use]
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            clock: self.clock.as_ref(),
            text: self.text.as_ref(),
            image: self.image.as_ref(),
            sync: &self.sync,
        }
    }
}
