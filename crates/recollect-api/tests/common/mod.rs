//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use recollect_api::state::AppState;
use recollect_core::clock::Clock;
use recollect_interview::domain::profile::RespondentProfile;
use recollect_interview::domain::prompts::{
    CONTEXT_PARAMETERS, DEEP_QUESTIONS, NARRATIVE_REVISION, SCENE_RECONSTRUCTION,
};
use recollect_test_support::{FixedClock, StubImageGenerator, StubTextGenerator, fixed_now, narrative_json};
use tower::ServiceExt;

pub const FIRST_NARRATIVE: &str = "I waited alone on the platform.";
pub const REVISED_NARRATIVE: &str = "I waited alone on the platform, hoping my friend would come.";
pub const QUESTIONS: [&str; 3] = [
    "What did you hear?",
    "Who were you waiting for?",
    "How long did you wait?",
];

/// A router together with the state and doubles behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub text: Arc<StubTextGenerator>,
    pub image: Arc<StubImageGenerator>,
}

/// Text generator answering every prompt kind the engine sends.
pub fn scripted_text() -> StubTextGenerator {
    StubTextGenerator::new()
        .respond_to(
            SCENE_RECONSTRUCTION,
            vec![Ok(narrative_json(
                FIRST_NARRATIVE,
                &["lonely", "calm", "tired"],
                &["quiet", "cold", "dim"],
                &["bench", "train", "clock"],
            ))],
        )
        .respond_to(
            NARRATIVE_REVISION,
            vec![Ok(narrative_json(
                REVISED_NARRATIVE,
                &["lonely", "hopeful", "tired"],
                &["quiet", "cold", "dim"],
                &["bench", "train", "phone"],
            ))],
        )
        .respond_to(DEEP_QUESTIONS, vec![Ok(QUESTIONS.join("\n"))])
        .respond_to(
            CONTEXT_PARAMETERS,
            vec![Ok(r#"{"light": 0, "people": 0, "distance": 1}"#.to_owned())],
        )
}

/// Build the full app router with scripted generators and a fixed clock.
pub fn build_test_app() -> TestApp {
    build_test_app_with(scripted_text(), StubImageGenerator::new())
}

/// Build the full app router around the given generator doubles. Uses the
/// same route structure as `main.rs`.
pub fn build_test_app_with(text: StubTextGenerator, image: StubImageGenerator) -> TestApp {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(fixed_now()));
    let text = Arc::new(text);
    let image = Arc::new(image);
    let state = AppState::new(
        clock,
        text.clone(),
        image.clone(),
        64,
        "English",
        RespondentProfile {
            name: Some("Mina".to_owned()),
            ..RespondentProfile::default()
        },
    );
    TestApp {
        router: recollect_api::app(state.clone()),
        state,
        text,
        image,
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, bytes) = get_bytes(app, uri).await;
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

/// Send a GET request and return status, content type and raw body.
pub async fn get_bytes(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_owned());
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, content_type, body_bytes.to_vec())
}

/// Commits the first scene about a train platform.
pub async fn commit_first_scene(app: &TestApp) -> serde_json::Value {
    let (status, json) = post_json(
        app.router.clone(),
        "/api/v1/interview/scenes",
        &serde_json::json!({
            "topic": { "what": "waiting for a train", "place": "Busan Station" },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "commit failed: {json}");
    json
}
