//! Recollect Archive — exports a session as one zip bundle.
//!
//! ```text
//! <respondent>_<yyyy-mm-dd>/
//!   transcript.txt
//!   manifest.json
//!   images/scene_<s>_<v>.<ext>
//!   panoramas/scene_<s>_<v>_360.<ext>
//!   scenes/scene_<s>_<v>/
//!     narrative.txt
//!     prompt.txt
//!     keywords.txt
//!     metadata.json
//! ```
//!
//! Only the newest record of each `(scene, variation)` key is exported; the
//! transcript still covers every logged interaction.

pub mod error;
pub mod exporter;
pub mod transcript;

pub use error::ArchiveError;
pub use exporter::{ExportBundle, SessionMeta, export, export_session, suggested_file_name};
