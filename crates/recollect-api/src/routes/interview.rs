//! Routes for the interview session: scene commits, the deep-question loop,
//! remix, history restore, panorama expansion and export.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use recollect_archive::export_session;
use recollect_core::error::DomainError;
use recollect_interview::application::command_handlers;
use recollect_interview::application::query_handlers::{self, SessionView};
use recollect_interview::domain::commands;
use recollect_interview::domain::history::HistoryEntryView;
use recollect_interview::domain::keywords::KeywordPanelView;
use recollect_interview::domain::profile::{
    ContextParameters, Level, RespondentProfile, SceneTopic,
};
use recollect_interview::domain::scene::{SceneId, SceneKey, SceneRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Context dials on the 0–2 scale.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContextRequest {
    /// Light: dark, normal, bright.
    pub light: i64,
    /// People: quiet, normal, crowded.
    pub people: i64,
    /// Distance: close-up, medium, wide.
    pub distance: i64,
}

fn level(name: &str, step: i64) -> Result<Level, DomainError> {
    Level::from_step(step)
        .ok_or_else(|| DomainError::Validation(format!("{name} must be 0, 1 or 2, got {step}")))
}

impl TryFrom<ContextRequest> for ContextParameters {
    type Error = DomainError;

    fn try_from(request: ContextRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            light: level("light", request.light)?,
            people: level("people", request.people)?,
            distance: level("distance", request.distance)?,
        })
    }
}

fn parameters(context: Option<ContextRequest>) -> Result<Option<ContextParameters>, DomainError> {
    context.map(ContextParameters::try_from).transpose()
}

/// Request body for POST /session.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// The respondent.
    #[serde(default)]
    pub profile: RespondentProfile,
    /// Questions prepared before the interview.
    #[serde(default)]
    pub planned_questions: Vec<String>,
}

/// Request body for POST /scenes.
#[derive(Debug, Deserialize)]
pub struct CommitSceneRequest {
    /// 5W1H answers.
    #[serde(default)]
    pub topic: SceneTopic,
    /// Context dials, if changed.
    pub context: Option<ContextRequest>,
}

/// Request body for POST /questions/select.
#[derive(Debug, Deserialize)]
pub struct SelectQuestionRequest {
    /// The exact text of a displayed question.
    pub question: String,
}

/// Request body for POST /answers.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    /// The respondent's answer to the selected question.
    pub answer: String,
}

/// Request body for POST /remix.
#[derive(Debug, Deserialize)]
pub struct RemixRequest {
    /// Free-text edit; empty means "apply the context dials".
    #[serde(default)]
    pub instruction: String,
    /// Context dials, if changed.
    pub context: Option<ContextRequest>,
    /// Regenerate the panorama for the same scene number.
    #[serde(default)]
    pub refresh_panorama: bool,
}

/// Response body for commands that commit a scene.
#[derive(Debug, Serialize)]
pub struct SceneResponse {
    /// The new record's id.
    pub scene_id: SceneId,
    /// The new record's key.
    pub key: SceneKey,
    /// Session state after the commit.
    pub session: SessionView,
}

/// Response body for POST /questions/select.
#[derive(Debug, Serialize)]
pub struct SelectQuestionResponse {
    /// The selected question.
    pub question: String,
}

/// Response body for POST /panorama.
#[derive(Debug, Serialize)]
pub struct PanoramaResponse {
    /// `data:` URI of the panorama.
    pub panorama_src: String,
}

fn scene_response(record: &SceneRecord, session: SessionView) -> Json<SceneResponse> {
    Json(SceneResponse {
        scene_id: record.id,
        key: record.key,
        session,
    })
}

/// POST /session
#[instrument(skip(state, request))]
async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
        profile: request.profile,
        planned_questions: request.planned_questions,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let mut session = state.try_session()?;
    *session = command_handlers::handle_start_session(&command, &state.language);

    Ok(Json(query_handlers::get_session(&session)))
}

/// GET /session
async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(query_handlers::get_session(&session))
}

/// POST /scenes
#[instrument(skip(state, request))]
async fn commit_scene(
    State(state): State<AppState>,
    Json(request): Json<CommitSceneRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::CommitScene {
        correlation_id: Uuid::new_v4(),
        topic: request.topic,
        parameters: parameters(request.context)?,
    };

    info!(correlation_id = %command.correlation_id, "handling commit_scene command");

    let mut session = state.try_session()?;
    let record =
        command_handlers::handle_commit_scene(&command, &mut session, state.collaborators())
            .await?;

    Ok(scene_response(&record, query_handlers::get_session(&session)))
}

/// POST /questions/select
#[instrument(skip(state, request))]
async fn select_question(
    State(state): State<AppState>,
    Json(request): Json<SelectQuestionRequest>,
) -> Result<Json<SelectQuestionResponse>, ApiError> {
    let command = commands::SelectQuestion {
        correlation_id: Uuid::new_v4(),
        question: request.question,
    };

    info!(correlation_id = %command.correlation_id, "handling select_question command");

    let mut session = state.try_session()?;
    let question = command_handlers::handle_select_question(&command, &mut session, &state.sync)?;

    Ok(Json(SelectQuestionResponse { question }))
}

/// POST /answers
#[instrument(skip(state, request))]
async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::SubmitAnswer {
        correlation_id: Uuid::new_v4(),
        answer: request.answer,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_answer command");

    let mut session = state.try_session()?;
    let record =
        command_handlers::handle_submit_answer(&command, &mut session, state.collaborators())
            .await?;

    Ok(scene_response(&record, query_handlers::get_session(&session)))
}

/// POST /remix
#[instrument(skip(state, request), fields(refresh_panorama = request.refresh_panorama))]
async fn remix_image(
    State(state): State<AppState>,
    Json(request): Json<RemixRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::RemixImage {
        correlation_id: Uuid::new_v4(),
        instruction: request.instruction,
        parameters: parameters(request.context)?,
        refresh_panorama: request.refresh_panorama,
    };

    info!(correlation_id = %command.correlation_id, "handling remix_image command");

    let mut session = state.try_session()?;
    let record =
        command_handlers::handle_remix_image(&command, &mut session, state.collaborators())
            .await?;

    Ok(scene_response(&record, query_handlers::get_session(&session)))
}

/// POST /scenes/{scene_id}/restore
#[instrument(skip(state))]
async fn restore_scene(
    State(state): State<AppState>,
    Path(scene_id): Path<u64>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::RestoreScene {
        correlation_id: Uuid::new_v4(),
        scene_id: SceneId::new(scene_id),
    };

    info!(correlation_id = %command.correlation_id, "handling restore_scene command");

    let mut session = state.try_session()?;
    command_handlers::handle_restore_scene(&command, &mut session)?;

    Ok(Json(query_handlers::get_session(&session)))
}

/// POST /panorama
#[instrument(skip(state))]
async fn expand_panorama(
    State(state): State<AppState>,
) -> Result<Json<PanoramaResponse>, ApiError> {
    let command = commands::ExpandPanorama {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling expand_panorama command");

    let mut session = state.try_session()?;
    let panorama =
        command_handlers::handle_expand_panorama(&command, &mut session, state.collaborators())
            .await?;

    Ok(Json(PanoramaResponse {
        panorama_src: panorama.data_uri(),
    }))
}

/// POST /keywords/toggle
async fn toggle_keywords(State(state): State<AppState>) -> Result<Json<KeywordPanelView>, ApiError> {
    let mut session = state.try_session()?;
    let panel = session.keyword_panel_mut();
    panel.toggle();
    Ok(Json(panel.render()))
}

/// GET /history
async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryEntryView>> {
    let session = state.session.lock().await;
    Json(query_handlers::get_history(&session))
}

/// GET /export
#[instrument(skip(state))]
async fn export_archive(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.lock().await;
    let bundle = export_session(&session, state.clock.as_ref())?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", bundle.file_name),
            ),
        ],
        bundle.bytes,
    ))
}

/// Returns the router for the interview context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", post(start_session).get(get_session))
        .route("/scenes", post(commit_scene))
        .route("/scenes/{scene_id}/restore", post(restore_scene))
        .route("/questions/select", post(select_question))
        .route("/answers", post(submit_answer))
        .route("/remix", post(remix_image))
        .route("/panorama", post(expand_panorama))
        .route("/keywords/toggle", post(toggle_keywords))
        .route("/history", get(get_history))
        .route("/export", get(export_archive))
}
