//! Recollect Sync — the cross-context sync channel.
//!
//! The authoring session pushes presentation updates to a loosely coupled
//! viewer context (a second window, a projector, a respondent's tablet).
//! Delivery is one-way and fire-and-forget: no acknowledgement, no retry,
//! and every send first checks that a viewer is listening.

pub mod broadcast;
pub mod channel;

pub use broadcast::BroadcastViewer;
pub use channel::{LoadingGuard, SyncChannel, hashtags};
pub use recollect_core::viewer::{ViewerChannel, ViewerMessage};
