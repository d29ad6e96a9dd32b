//! Recollect — interview session and scene evolution context.
//!
//! Responsible for turning interview inputs into a branching history of
//! scene artifacts: narrative generation and revision, the deep-question
//! loop, scene history with restore, and the per-scene panorama cache.

pub mod application;
pub mod domain;
