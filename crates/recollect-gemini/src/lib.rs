//! Recollect Gemini — text and image generation over the Gemini REST API.
//!
//! `GeminiClient` implements both `TextGenerator` and `ImageGenerator` from
//! `recollect-core`. Request and response bodies live in [`wire`]; the
//! client only does HTTP.

pub mod client;
pub mod wire;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT_SECS, GeminiClient,
    GeminiConfig,
};
