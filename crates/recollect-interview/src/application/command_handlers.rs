//! Command handlers for the interview context.
//!
//! Each evolution step (commit, answer, remix) runs the same pipeline:
//! narrative, image, panorama, history append, log entry, question refresh,
//! viewer sync. A narrative or image failure aborts the step and rolls the
//! working state back, as does dropping the handler's future before the
//! history append; panorama, context and question failures only degrade it.

use recollect_core::clock::Clock;
use recollect_core::command::Command;
use recollect_core::error::DomainError;
use recollect_core::generation::{GenerationError, ImageGenerator, TextGenerator};
use recollect_core::image::ImageRef;
use recollect_sync::{SyncChannel, hashtags};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::deep_questions::generate_questions;
use super::imagery::{self, Illustration};
use super::narrative;
use crate::domain::aggregates::InterviewSession;
use crate::domain::commands::{
    CommitScene, ExpandPanorama, RemixImage, RestoreScene, SelectQuestion, StartSession,
    SubmitAnswer,
};
use crate::domain::events::{
    ImageModify, InitialResponse, InteractionKind, QuestionAnswer, SceneCreate,
};
use crate::domain::prompts;
use crate::domain::scene::{SceneKey, SceneRecord};

/// Everything an evolution step talks to besides the session itself.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Time source for ids, labels and log entries.
    pub clock: &'a dyn Clock,
    /// Text generation backend.
    pub text: &'a dyn TextGenerator,
    /// Image generation backend.
    pub image: &'a dyn ImageGenerator,
    /// Viewer sync channel.
    pub sync: &'a SyncChannel,
}

fn log_command(command: &dyn Command) {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        "handling command"
    );
}

fn non_fatal<T>(result: Result<T, GenerationError>, step: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%error, step, "generation step failed, continuing without it");
            None
        }
    }
}

fn sync_scene(session: &InterviewSession, sync: &SyncChannel) {
    let state = session.state();
    sync.sync_all(
        &state.narrative,
        state.selected_question.as_deref(),
        hashtags(state.keywords.as_slices()),
        state.panorama.as_ref(),
        state.image.as_ref(),
    );
}

fn show_illustration(session: &mut InterviewSession, illustration: Illustration) {
    session.state.image = Some(illustration.image);
    session.state.prompt = illustration.prompt;
}

async fn adopt_suggested_context(session: &mut InterviewSession, text: &dyn TextGenerator) {
    if let Some(parameters) = imagery::suggest_context(text, &session.state.narrative).await {
        debug!(?parameters, "adopting suggested context");
        session.set_parameters(parameters);
    }
}

async fn cached_panorama(
    session: &mut InterviewSession,
    image: &dyn ImageGenerator,
    scene: u32,
) -> Option<ImageRef> {
    let result = imagery::get_or_create_panorama(
        image,
        &mut session.panoramas,
        scene,
        &session.state.narrative,
        session.topic.location(),
        None,
    )
    .await;
    non_fatal(result, "panorama")
}

async fn refresh_questions(session: &mut InterviewSession, text: &dyn TextGenerator) {
    let batch = generate_questions(text, &session.state.narrative, &session.language).await;
    session.questions.show_generated(batch);
    session.questions.clear_selection();
}

/// Starts a new session for the given respondent.
#[must_use]
pub fn handle_start_session(command: &StartSession, language: &str) -> InterviewSession {
    log_command(command);
    InterviewSession::new(
        Uuid::new_v4(),
        command.profile.clone(),
        command.planned_questions.clone(),
        language,
    )
}

/// Handles the `CommitScene` command: generates a narrative from the topic,
/// illustrates it, commits it as a new scene and refreshes the questions.
///
/// The first commit is scene (1, 1) and logs `initial_response`; later
/// commits start the next scene number and log `scene_create`.
///
/// # Errors
///
/// Returns `DomainError::Generation` if the narrative or illustration fails;
/// the working state is rolled back.
pub async fn handle_commit_scene(
    command: &CommitScene,
    session: &mut InterviewSession,
    collaborators: Collaborators<'_>,
) -> Result<SceneRecord, DomainError> {
    log_command(command);
    let loading = collaborators.sync.begin_loading();
    let mut step = session.begin_step();
    if let Some(parameters) = command.parameters {
        step.set_parameters(parameters);
    }
    let record = commit_scene(command, &mut step, collaborators).await?;
    step.keep();

    refresh_questions(session, collaborators.text).await;
    sync_scene(session, collaborators.sync);
    loading.complete();
    Ok(record)
}

async fn commit_scene(
    command: &CommitScene,
    session: &mut InterviewSession,
    c: Collaborators<'_>,
) -> Result<SceneRecord, DomainError> {
    let first = session.history().is_empty();
    let key = if first {
        SceneKey::FIRST
    } else {
        session.next_scene_key()
    };

    let result = narrative::generate_initial(session, c.text, &command.topic).await?;
    session.state.selected_question = None;
    adopt_suggested_context(session, c.text).await;
    let illustration = imagery::illustrate(c.image, session).await?;
    show_illustration(session, illustration);

    let panorama = imagery::get_or_create_panorama(
        c.image,
        &mut session.panoramas,
        key.scene,
        &session.state.narrative,
        command.topic.location(),
        None,
    )
    .await;
    session.state.panorama = non_fatal(panorama, "panorama");

    let id = session.commit_working_state(key, c.clock)?;
    session.topic = command.topic.clone();
    let kind = if first {
        InteractionKind::InitialResponse(InitialResponse {
            scene: key,
            topic: command.topic.clone(),
            narrative: result.narrative,
            keywords: result.keywords,
        })
    } else {
        InteractionKind::SceneCreate(SceneCreate {
            scene: key,
            topic: command.topic.clone(),
            narrative: result.narrative,
            keywords: result.keywords,
        })
    };
    session.record(kind, command.correlation_id, c.clock);
    Ok(session.history().get(id)?.clone())
}

/// Handles the `SelectQuestion` command: selects a displayed question and
/// pushes it to the viewer.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the question is not on display.
pub fn handle_select_question(
    command: &SelectQuestion,
    session: &mut InterviewSession,
    sync: &SyncChannel,
) -> Result<String, DomainError> {
    log_command(command);
    let question = session.questions.select(&command.question)?.to_owned();
    session.state.selected_question = Some(question.clone());
    sync.sync_question(&question);
    Ok(question)
}

/// Handles the `SubmitAnswer` command: revises the narrative with the
/// answer, edits the illustration to match, and commits the result under
/// the current scene key.
///
/// # Errors
///
/// Returns `DomainError::NoSceneCommitted` before the first commit,
/// `DomainError::Validation` without a selected question or answer text, and
/// `DomainError::Generation` if the revision or image edit fails (the
/// working state is rolled back).
pub async fn handle_submit_answer(
    command: &SubmitAnswer,
    session: &mut InterviewSession,
    collaborators: Collaborators<'_>,
) -> Result<SceneRecord, DomainError> {
    log_command(command);
    if !session.has_committed() {
        return Err(DomainError::NoSceneCommitted);
    }
    let question = session
        .questions()
        .selected()
        .map(str::to_owned)
        .ok_or_else(|| DomainError::Validation("select a question before answering".into()))?;
    let answer = command.answer.trim();
    if answer.is_empty() {
        return Err(DomainError::Validation("answer must not be empty".into()));
    }

    let loading = collaborators.sync.begin_loading();
    let mut step = session.begin_step();
    let record = answer_question(command, &mut step, collaborators, question, answer).await?;
    step.keep();

    refresh_questions(session, collaborators.text).await;
    sync_scene(session, collaborators.sync);
    loading.complete();
    Ok(record)
}

async fn answer_question(
    command: &SubmitAnswer,
    session: &mut InterviewSession,
    c: Collaborators<'_>,
    question: String,
    answer: &str,
) -> Result<SceneRecord, DomainError> {
    let key = session.current_key()?;
    let result = narrative::revise_with_answer(session, c.text, &question, answer).await?;
    adopt_suggested_context(session, c.text).await;
    let illustration =
        imagery::edit_in_place(c.image, session, prompts::ANSWER_EDIT_INSTRUCTION).await?;
    show_illustration(session, illustration);
    session.state.panorama = cached_panorama(session, c.image, key.scene).await;
    session.state.selected_question = Some(question.clone());

    let id = session.commit_working_state(key, c.clock)?;
    session.record(
        InteractionKind::QuestionAnswer(QuestionAnswer {
            scene: key,
            question,
            answer: answer.to_owned(),
            narrative: result.narrative,
            keywords: result.keywords,
        }),
        command.correlation_id,
        c.clock,
    );
    Ok(session.history().get(id)?.clone())
}

/// Handles the `RemixImage` command: edits the illustration only, commits
/// it as the next variation of the current scene and refreshes the
/// questions.
///
/// # Errors
///
/// Returns `DomainError::NoSceneCommitted` before the first commit and
/// `DomainError::Generation` if the image edit fails (the working state is
/// rolled back).
pub async fn handle_remix_image(
    command: &RemixImage,
    session: &mut InterviewSession,
    collaborators: Collaborators<'_>,
) -> Result<SceneRecord, DomainError> {
    log_command(command);
    if !session.has_committed() {
        return Err(DomainError::NoSceneCommitted);
    }
    let instruction = match command.instruction.trim() {
        "" => prompts::DEFAULT_REMIX_INSTRUCTION,
        text => text,
    };

    let loading = collaborators.sync.begin_loading();
    let mut step = session.begin_step();
    if let Some(parameters) = command.parameters {
        step.set_parameters(parameters);
    }
    let record = remix(command, &mut step, collaborators, instruction).await?;
    step.keep();

    refresh_questions(session, collaborators.text).await;
    sync_scene(session, collaborators.sync);
    loading.complete();
    Ok(record)
}

async fn remix(
    command: &RemixImage,
    session: &mut InterviewSession,
    c: Collaborators<'_>,
    instruction: &str,
) -> Result<SceneRecord, DomainError> {
    let key = session.next_variation_key()?;
    let illustration = imagery::edit_in_place(c.image, session, instruction).await?;
    show_illustration(session, illustration);

    session.state.panorama = if command.refresh_panorama {
        let refreshed = imagery::refresh_panorama(
            c.image,
            &mut session.panoramas,
            key.scene,
            &session.state.narrative,
            session.topic.location(),
            Some(instruction),
        )
        .await;
        non_fatal(refreshed, "panorama refresh")
            .or_else(|| session.panoramas.get(key.scene).cloned())
    } else {
        cached_panorama(session, c.image, key.scene).await
    };

    let id = session.commit_working_state(key, c.clock)?;
    session.record(
        InteractionKind::ImageModify(ImageModify {
            scene: key,
            instruction: instruction.to_owned(),
            refresh_panorama: command.refresh_panorama,
        }),
        command.correlation_id,
        c.clock,
    );
    Ok(session.history().get(id)?.clone())
}

/// Handles the `RestoreScene` command: copies a committed record back into
/// the working state. Writes no log entry and sends nothing to the viewer.
///
/// # Errors
///
/// Returns `DomainError::SceneNotFound` for unknown ids.
pub fn handle_restore_scene(
    command: &RestoreScene,
    session: &mut InterviewSession,
) -> Result<SceneRecord, DomainError> {
    log_command(command);
    session.restore(command.scene_id)
}

/// Handles the `ExpandPanorama` command: shows the current scene's panorama,
/// generating it on first use and filling the matching record's empty
/// panorama slot.
///
/// # Errors
///
/// Returns `DomainError::NoSceneCommitted` before the first commit and
/// `DomainError::Generation` if the panorama cannot be generated.
pub async fn handle_expand_panorama(
    command: &ExpandPanorama,
    session: &mut InterviewSession,
    collaborators: Collaborators<'_>,
) -> Result<ImageRef, DomainError> {
    log_command(command);
    let key = session.current_key()?;
    let loading = collaborators.sync.begin_loading();

    let panorama = match session.state.panorama.clone() {
        Some(existing) => existing,
        None => {
            imagery::get_or_create_panorama(
                collaborators.image,
                &mut session.panoramas,
                key.scene,
                &session.state.narrative,
                session.topic.location(),
                None,
            )
            .await?
        }
    };
    session.state.panorama = Some(panorama.clone());
    if let Some(id) = session.attach_panorama_to_current(&panorama) {
        debug!(scene_id = %id, "panorama attached to committed scene");
    }

    sync_scene(session, collaborators.sync);
    loading.complete();
    Ok(panorama)
}
