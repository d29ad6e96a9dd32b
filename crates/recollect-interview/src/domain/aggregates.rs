//! Aggregate root for the interview context.

use std::ops::{Deref, DerefMut};

use recollect_core::clock::Clock;
use recollect_core::error::DomainError;
use uuid::Uuid;

use super::events::{InteractionEvent, InteractionKind, InteractionLog};
use super::history::SceneHistory;
use super::keywords::{KeywordPanel, KeywordSets};
use super::panorama::PanoramaCache;
use super::profile::{ContextParameters, RespondentProfile, SceneTopic};
use super::questions::QuestionBoard;
use super::scene::{CurrentSceneState, SceneId, SceneIdGenerator, SceneKey, SceneRecord};

/// Whether image-loaded side effects run in full or only refresh the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// Normal operation.
    #[default]
    Idle,
    /// A committed scene is being copied back into the working state.
    Restoring,
}

/// View flags derived from what the session has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presentation {
    /// An illustration is on screen.
    pub has_image: bool,
    /// The question and remix area has been revealed.
    pub interaction_visible: bool,
}

/// Working state captured before an evolution step, restored if the step
/// fails.
#[derive(Debug, Clone)]
pub struct WorkingSnapshot {
    state: CurrentSceneState,
    keyword_panel: KeywordPanel,
    parameters: ContextParameters,
}

/// One authoring session: the working scene, its history and log, and the
/// interview inputs that feed generation.
#[derive(Debug)]
pub struct InterviewSession {
    /// Session identifier.
    pub id: Uuid,
    pub(crate) profile: RespondentProfile,
    pub(crate) language: String,
    pub(crate) parameters: ContextParameters,
    pub(crate) topic: SceneTopic,
    pub(crate) state: CurrentSceneState,
    pub(crate) history: SceneHistory,
    pub(crate) log: InteractionLog,
    pub(crate) panoramas: PanoramaCache,
    pub(crate) questions: QuestionBoard,
    pub(crate) keyword_panel: KeywordPanel,
    pub(crate) presentation: Presentation,
    ids: SceneIdGenerator,
    mode: SessionMode,
}

impl InterviewSession {
    /// Creates an empty session for `profile`.
    #[must_use]
    pub fn new(
        id: Uuid,
        profile: RespondentProfile,
        planned_questions: Vec<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id,
            profile,
            language: language.into(),
            parameters: ContextParameters::default(),
            topic: SceneTopic::default(),
            state: CurrentSceneState::default(),
            history: SceneHistory::default(),
            log: InteractionLog::new(id),
            panoramas: PanoramaCache::default(),
            questions: QuestionBoard::with_planned(planned_questions),
            keyword_panel: KeywordPanel::default(),
            presentation: Presentation::default(),
            ids: SceneIdGenerator::default(),
            mode: SessionMode::Idle,
        }
    }

    /// The respondent.
    #[must_use]
    pub fn profile(&self) -> &RespondentProfile {
        &self.profile
    }

    /// Language narratives and questions are written in.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Current context dials.
    #[must_use]
    pub fn parameters(&self) -> ContextParameters {
        self.parameters
    }

    /// Sets the context dials.
    pub fn set_parameters(&mut self, parameters: ContextParameters) {
        self.parameters = parameters;
    }

    /// The most recent 5W1H topic.
    #[must_use]
    pub fn topic(&self) -> &SceneTopic {
        &self.topic
    }

    /// The working state.
    #[must_use]
    pub fn state(&self) -> &CurrentSceneState {
        &self.state
    }

    /// Committed scenes.
    #[must_use]
    pub fn history(&self) -> &SceneHistory {
        &self.history
    }

    /// Interaction log.
    #[must_use]
    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    /// Panorama cache.
    #[must_use]
    pub fn panoramas(&self) -> &PanoramaCache {
        &self.panoramas
    }

    /// Question board.
    #[must_use]
    pub fn questions(&self) -> &QuestionBoard {
        &self.questions
    }

    /// Keyword panel.
    #[must_use]
    pub fn keyword_panel(&self) -> &KeywordPanel {
        &self.keyword_panel
    }

    /// Keyword panel, for toggling.
    pub fn keyword_panel_mut(&mut self) -> &mut KeywordPanel {
        &mut self.keyword_panel
    }

    /// View flags.
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Whether a scene has been committed.
    #[must_use]
    pub fn has_committed(&self) -> bool {
        self.state.committed
    }

    /// Captures the working state before an evolution step.
    #[must_use]
    pub fn snapshot(&self) -> WorkingSnapshot {
        WorkingSnapshot {
            state: self.state.clone(),
            keyword_panel: self.keyword_panel.clone(),
            parameters: self.parameters,
        }
    }

    /// Puts a captured working state back.
    pub fn rollback(&mut self, snapshot: WorkingSnapshot) {
        self.state = snapshot.state;
        self.keyword_panel = snapshot.keyword_panel;
        self.parameters = snapshot.parameters;
    }

    /// Replaces narrative and keywords in the working state and opens the
    /// keyword panel.
    pub(crate) fn apply_narrative(&mut self, narrative: String, keywords: KeywordSets) {
        self.state.narrative = narrative;
        self.keyword_panel.update(&keywords);
        self.state.keywords = keywords;
    }

    /// Key for a scene started from scratch.
    #[must_use]
    pub fn next_scene_key(&self) -> SceneKey {
        SceneKey::new(self.history.max_scene() + 1, 1)
    }

    /// Key for the next variation of the current scene.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoSceneCommitted` before the first commit.
    pub fn next_variation_key(&self) -> Result<SceneKey, DomainError> {
        let current = self.state.key.ok_or(DomainError::NoSceneCommitted)?;
        Ok(SceneKey::new(
            current.scene,
            self.history.max_variation(current.scene) + 1,
        ))
    }

    /// Key of the scene being worked on.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoSceneCommitted` before the first commit.
    pub fn current_key(&self) -> Result<SceneKey, DomainError> {
        self.state.key.ok_or(DomainError::NoSceneCommitted)
    }

    /// Appends the working state to the history under `key` and runs the
    /// image-loaded side effects.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the working state has no image.
    pub(crate) fn commit_working_state(
        &mut self,
        key: SceneKey,
        clock: &dyn Clock,
    ) -> Result<SceneId, DomainError> {
        let id = self.ids.next_id(clock.now_millis());
        self.history
            .commit(id, key, clock.local_label(), &self.state)?;
        self.state.key = Some(key);
        self.state.committed = true;
        self.on_image_loaded();
        Ok(id)
    }

    /// Appends an interaction-log entry.
    pub(crate) fn record(
        &mut self,
        kind: InteractionKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> &InteractionEvent {
        self.log.append(kind, correlation_id, clock)
    }

    /// Side effects of a new image reaching the screen. While restoring only
    /// the image styling is refreshed.
    fn on_image_loaded(&mut self) {
        self.presentation.has_image = true;
        if self.mode == SessionMode::Restoring {
            return;
        }
        self.presentation.interaction_visible = true;
    }

    /// Starts an evolution step. Unless the returned guard is kept, dropping
    /// it puts the working state back as it was here, whether the step
    /// failed or was abandoned mid-await.
    pub fn begin_step(&mut self) -> StepGuard<'_> {
        let snapshot = self.snapshot();
        StepGuard {
            session: self,
            snapshot: Some(snapshot),
        }
    }

    /// Enters restoring mode until the returned guard is dropped.
    pub fn begin_restore(&mut self) -> RestoreGuard<'_> {
        self.mode = SessionMode::Restoring;
        RestoreGuard { session: self }
    }

    /// Copies a committed record into the working state. No log entry, no
    /// regeneration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SceneNotFound` for unknown ids.
    pub fn restore(&mut self, id: SceneId) -> Result<SceneRecord, DomainError> {
        let record = self.history.get(id)?.clone();
        let mut guard = self.begin_restore();
        guard.state.load_record(&record);
        guard.keyword_panel.show(&record.keywords);
        guard.on_image_loaded();
        Ok(record)
    }

    /// Fills the panorama slot of the record showing the current image, or
    /// of the latest record when none matches. Returns the record id when a
    /// slot was filled.
    pub(crate) fn attach_panorama_to_current(
        &mut self,
        panorama: &recollect_core::image::ImageRef,
    ) -> Option<SceneId> {
        let target = self
            .state
            .image
            .as_ref()
            .and_then(|image| self.history.find_by_image(image))
            .or_else(|| self.history.latest())
            .map(|record| record.id)?;
        self.history
            .attach_panorama(target, panorama)
            .then_some(target)
    }
}

/// Holds the session in [`SessionMode::Restoring`]; dropping it returns the
/// session to [`SessionMode::Idle`] on every path.
#[derive(Debug)]
pub struct RestoreGuard<'a> {
    session: &'a mut InterviewSession,
}

impl Deref for RestoreGuard<'_> {
    type Target = InterviewSession;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for RestoreGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.session.mode = SessionMode::Idle;
    }
}

/// Rolls the working state back on drop unless [`StepGuard::keep`] was
/// called.
#[derive(Debug)]
pub struct StepGuard<'a> {
    session: &'a mut InterviewSession,
    snapshot: Option<WorkingSnapshot>,
}

impl StepGuard<'_> {
    /// Accepts the step's changes.
    pub fn keep(mut self) {
        self.snapshot = None;
    }
}

impl Deref for StepGuard<'_> {
    type Target = InterviewSession;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for StepGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for StepGuard<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.session.rollback(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::Level;
    use recollect_core::image::ImageRef;
    use recollect_test_support::{FixedClock, fixed_now};

    fn session() -> InterviewSession {
        InterviewSession::new(
            Uuid::new_v4(),
            RespondentProfile::default(),
            Vec::new(),
            "English",
        )
    }

    fn image(tag: &str) -> ImageRef {
        ImageRef::from_bytes("image/png", tag.as_bytes()).unwrap()
    }

    fn commit(session: &mut InterviewSession, narrative: &str, tag: &str, key: SceneKey) -> SceneId {
        session.state.narrative = narrative.to_owned();
        session.state.image = Some(image(tag));
        session
            .commit_working_state(key, &FixedClock(fixed_now()))
            .unwrap()
    }

    #[test]
    fn test_commit_sets_key_and_reveals_interaction() {
        // Arrange
        let mut session = session();

        // Act
        commit(&mut session, "first", "a", SceneKey::FIRST);

        // Assert
        assert!(session.has_committed());
        assert_eq!(session.current_key().unwrap(), SceneKey::FIRST);
        assert!(session.presentation().interaction_visible);
        assert_eq!(session.next_scene_key(), SceneKey::new(2, 1));
        assert_eq!(session.next_variation_key().unwrap(), SceneKey::new(1, 2));
    }

    #[test]
    fn test_variation_key_requires_commit() {
        let session = session();

        assert!(matches!(
            session.next_variation_key(),
            Err(DomainError::NoSceneCommitted)
        ));
    }

    #[test]
    fn test_restore_copies_record_and_returns_to_idle() {
        // Arrange
        let mut session = session();
        let first = commit(&mut session, "first", "a", SceneKey::FIRST);
        commit(&mut session, "second", "b", SceneKey::new(2, 1));

        // Act
        session.restore(first).unwrap();

        // Assert
        assert_eq!(session.state().narrative, "first");
        assert_eq!(session.state().image, Some(image("a")));
        assert_eq!(session.current_key().unwrap(), SceneKey::FIRST);
        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.history().len(), 2);
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_restore_unknown_id_leaves_mode_idle() {
        let mut session = session();

        let result = session.restore(SceneId::new(7));

        assert!(matches!(result, Err(DomainError::SceneNotFound(7))));
        assert_eq!(session.mode(), SessionMode::Idle);
    }

    #[test]
    fn test_restore_guard_resets_mode_on_drop() {
        // Arrange
        let mut session = session();

        // Act
        {
            let guard = session.begin_restore();
            assert_eq!(guard.mode(), SessionMode::Restoring);
        }

        // Assert
        assert_eq!(session.mode(), SessionMode::Idle);
    }

    #[test]
    fn test_restore_does_not_reveal_interaction_area() {
        // Arrange
        let mut session = session();
        let id = commit(&mut session, "first", "a", SceneKey::FIRST);
        session.presentation = Presentation::default();

        // Act
        session.restore(id).unwrap();

        // Assert
        assert!(session.presentation().has_image);
        assert!(!session.presentation().interaction_visible);
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        // Arrange
        let mut session = session();
        session.apply_narrative("before".to_owned(), KeywordSets::default());
        let snapshot = session.snapshot();

        // Act
        session.apply_narrative(
            "after".to_owned(),
            KeywordSets {
                emotions: vec!["x".to_owned()],
                ..KeywordSets::default()
            },
        );
        session.rollback(snapshot);

        // Assert
        assert_eq!(session.state().narrative, "before");
        assert!(session.state().keywords.is_empty());
    }

    #[test]
    fn test_dropped_step_rolls_back_narrative_and_dials() {
        // Arrange
        let mut session = session();
        session.apply_narrative("before".to_owned(), KeywordSets::default());

        // Act
        {
            let mut step = session.begin_step();
            step.set_parameters(ContextParameters {
                light: Level::High,
                ..ContextParameters::default()
            });
            step.apply_narrative("half done".to_owned(), KeywordSets::default());
        }

        // Assert
        assert_eq!(session.state().narrative, "before");
        assert_eq!(session.parameters(), ContextParameters::default());
    }

    #[test]
    fn test_kept_step_retains_changes() {
        // Arrange
        let mut session = session();

        // Act
        let mut step = session.begin_step();
        step.apply_narrative("done".to_owned(), KeywordSets::default());
        step.keep();

        // Assert
        assert_eq!(session.state().narrative, "done");
    }

    #[test]
    fn test_attach_panorama_targets_record_showing_current_image() {
        // Arrange
        let mut session = session();
        let first = commit(&mut session, "first", "a", SceneKey::FIRST);
        commit(&mut session, "second", "b", SceneKey::new(1, 2));
        session.restore(first).unwrap();

        // Act
        let filled = session.attach_panorama_to_current(&image("pano"));

        // Assert
        assert_eq!(filled, Some(first));
        assert!(session.history().latest().unwrap().panorama.is_none());
    }
}
