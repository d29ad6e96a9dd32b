//! Zip bundle writer.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use recollect_core::clock::Clock;
use recollect_core::error::DomainError;
use recollect_core::event::{DomainEvent, EventMetadata};
use recollect_interview::domain::aggregates::InterviewSession;
use recollect_interview::domain::events::InteractionLog;
use recollect_interview::domain::history::SceneHistory;
use recollect_interview::domain::keywords::KeywordSets;
use recollect_interview::domain::profile::RespondentProfile;
use recollect_interview::domain::scene::{SceneKey, SceneRecord};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::transcript::render_transcript;

/// Identity of the exported session.
#[derive(Debug, Clone)]
pub struct SessionMeta {
    /// Session identifier.
    pub session_id: Uuid,
    /// The respondent.
    pub profile: RespondentProfile,
    /// Export time; also names the root folder.
    pub exported_at: DateTime<Utc>,
}

impl SessionMeta {
    /// Root folder of the bundle, `<respondent>_<yyyy-mm-dd>`.
    #[must_use]
    pub fn root_folder(&self) -> String {
        format!(
            "{}_{}",
            self.profile.folder_slug(),
            self.exported_at.format("%Y-%m-%d")
        )
    }
}

/// A finished archive with the name to offer for download.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Suggested download name.
    pub file_name: String,
    /// Zip bytes.
    pub bytes: Vec<u8>,
}

/// Suggested download name, `contextual_inquiry_<yyyy-mm-dd>.zip`.
#[must_use]
pub fn suggested_file_name(at: DateTime<Utc>) -> String {
    format!("contextual_inquiry_{}.zip", at.format("%Y-%m-%d"))
}

#[derive(Debug, Serialize)]
struct ArtifactEntry {
    path: String,
    sha256: String,
    bytes: usize,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    session_id: Uuid,
    respondent: &'a RespondentProfile,
    exported_at: DateTime<Utc>,
    scene_count: usize,
    interaction_count: usize,
    artifacts: Vec<ArtifactEntry>,
}

#[derive(Debug, Serialize)]
struct SceneMetadata<'a> {
    id: u64,
    key: SceneKey,
    created_at: &'a str,
    image: String,
    panorama: Option<String>,
    keywords: &'a KeywordSets,
}

/// One log entry as written to `interactions.json`.
#[derive(Debug, Serialize)]
struct StoredInteraction<'a> {
    #[serde(flatten)]
    metadata: &'a EventMetadata,
    payload: serde_json::Value,
}

fn interactions_json(log: &InteractionLog) -> Result<String, ArchiveError> {
    let entries: Vec<StoredInteraction<'_>> = log
        .entries()
        .iter()
        .map(|event| StoredInteraction {
            metadata: event.metadata(),
            payload: event.to_payload(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Zip writer that records a hash for every entry it writes.
struct BundleWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    root: String,
    artifacts: Vec<ArtifactEntry>,
}

impl BundleWriter {
    fn new(root: String) -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            root,
            artifacts: Vec::new(),
        }
    }

    fn write(&mut self, path: &str, data: &[u8], method: CompressionMethod) -> Result<(), ArchiveError> {
        let options = SimpleFileOptions::default().compression_method(method);
        self.zip.start_file(format!("{}/{path}", self.root), options)?;
        self.zip.write_all(data)?;
        self.artifacts.push(ArtifactEntry {
            path: path.to_owned(),
            sha256: sha256_hex(data),
            bytes: data.len(),
        });
        Ok(())
    }

    fn text(&mut self, path: &str, text: &str) -> Result<(), ArchiveError> {
        self.write(path, text.as_bytes(), CompressionMethod::Deflated)
    }

    fn image(&mut self, path: &str, data: &[u8]) -> Result<(), ArchiveError> {
        self.write(path, data, CompressionMethod::Stored)
    }

    fn finish(mut self, manifest_json: &[u8]) -> Result<Vec<u8>, ArchiveError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip
            .start_file(format!("{}/manifest.json", self.root), options)?;
        self.zip.write_all(manifest_json)?;
        Ok(self.zip.finish()?.into_inner())
    }
}

fn keywords_text(keywords: &KeywordSets) -> String {
    let section = |title: &str, labels: &[String]| {
        let mut out = format!("{title}\n");
        for label in labels {
            out.push_str("- ");
            out.push_str(label);
            out.push('\n');
        }
        out
    };
    [
        section("Key emotions", &keywords.emotions),
        section("Atmosphere", &keywords.atmosphere),
        section("Key elements", &keywords.elements),
    ]
    .join("\n")
}

fn write_scene(bundle: &mut BundleWriter, record: &SceneRecord) -> Result<(), ArchiveError> {
    let stem = record.key.file_stem();
    let image_path = format!("images/{stem}.{}", record.image.file_extension());
    bundle.image(&image_path, &record.image.decode()?)?;

    let panorama_path = match &record.panorama {
        Some(panorama) => {
            let path = format!("panoramas/{stem}_360.{}", panorama.file_extension());
            bundle.image(&path, &panorama.decode()?)?;
            Some(path)
        }
        None => None,
    };

    let folder = format!("scenes/{stem}");
    bundle.text(&format!("{folder}/narrative.txt"), &record.narrative)?;
    bundle.text(&format!("{folder}/prompt.txt"), &record.prompt_used)?;
    bundle.text(&format!("{folder}/keywords.txt"), &keywords_text(&record.keywords))?;
    let metadata = SceneMetadata {
        id: record.id.value(),
        key: record.key,
        created_at: &record.created_at,
        image: image_path,
        panorama: panorama_path,
        keywords: &record.keywords,
    };
    bundle.text(
        &format!("{folder}/metadata.json"),
        &serde_json::to_string_pretty(&metadata)?,
    )
}

/// Writes the whole session into one zip archive.
///
/// # Errors
///
/// Returns `DomainError::EmptyHistory` (producing nothing) when no scene was
/// committed, and `DomainError::Infrastructure` if writing fails.
pub fn export(
    history: &SceneHistory,
    log: &InteractionLog,
    meta: &SessionMeta,
) -> Result<Vec<u8>, DomainError> {
    if history.is_empty() {
        return Err(DomainError::EmptyHistory);
    }
    let scenes = history.latest_per_key();
    let mut bundle = BundleWriter::new(meta.root_folder());

    bundle.text("transcript.txt", &render_transcript(meta, log, scenes.len()))?;
    bundle.text("interactions.json", &interactions_json(log)?)?;
    for record in &scenes {
        write_scene(&mut bundle, record)?;
    }

    let manifest = Manifest {
        session_id: meta.session_id,
        respondent: &meta.profile,
        exported_at: meta.exported_at,
        scene_count: scenes.len(),
        interaction_count: log.len(),
        artifacts: std::mem::take(&mut bundle.artifacts),
    };
    let manifest_json = serde_json::to_vec_pretty(&manifest).map_err(ArchiveError::from)?;
    let bytes = bundle.finish(&manifest_json)?;

    info!(
        session_id = %meta.session_id,
        scenes = scenes.len(),
        committed = history.len(),
        bytes = bytes.len(),
        "session exported"
    );
    Ok(bytes)
}

/// Exports `session` stamped with the clock's current time.
///
/// # Errors
///
/// See [`export`].
pub fn export_session(
    session: &InterviewSession,
    clock: &dyn Clock,
) -> Result<ExportBundle, DomainError> {
    let meta = SessionMeta {
        session_id: session.id,
        profile: session.profile().clone(),
        exported_at: clock.now(),
    };
    let bytes = export(session.history(), session.log(), &meta)?;
    Ok(ExportBundle {
        file_name: suggested_file_name(meta.exported_at),
        bytes,
    })
}
