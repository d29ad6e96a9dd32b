//! Human-readable interview transcript.

use recollect_interview::domain::events::InteractionLog;

use crate::exporter::SessionMeta;

/// Renders interview metadata followed by every log entry in order.
#[must_use]
pub fn render_transcript(meta: &SessionMeta, log: &InteractionLog, scene_count: usize) -> String {
    let mut out = String::from("CONTEXTUAL INQUIRY TRANSCRIPT\n\n");
    out.push_str(&format!("Respondent: {}\n", meta.profile.name()));
    out.push_str(&format!("Gender: {}\n", meta.profile.gender()));
    out.push_str(&format!("Age: {}\n", meta.profile.age()));
    out.push_str(&format!("Session: {}\n", meta.session_id));
    out.push_str(&format!(
        "Exported: {}\n",
        meta.exported_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Scenes exported: {scene_count}\n"));
    out.push_str(&format!("Interactions: {}\n", log.len()));

    for entry in log.entries() {
        out.push('\n');
        out.push_str(&entry.transcript_block());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use recollect_interview::domain::events::{ImageModify, InteractionKind};
    use recollect_interview::domain::profile::RespondentProfile;
    use recollect_interview::domain::scene::SceneKey;
    use recollect_test_support::{FixedClock, fixed_now};
    use uuid::Uuid;

    #[test]
    fn test_transcript_has_header_then_entries() {
        // Arrange
        let session_id = Uuid::new_v4();
        let meta = SessionMeta {
            session_id,
            profile: RespondentProfile {
                name: Some("Mina".to_owned()),
                ..RespondentProfile::default()
            },
            exported_at: fixed_now(),
        };
        let mut log = InteractionLog::new(session_id);
        log.append(
            InteractionKind::ImageModify(ImageModify {
                scene: SceneKey::new(1, 2),
                instruction: "brighter".to_owned(),
                refresh_panorama: false,
            }),
            Uuid::new_v4(),
            &FixedClock(fixed_now()),
        );

        // Act
        let transcript = render_transcript(&meta, &log, 1);

        // Assert
        assert!(transcript.starts_with("CONTEXTUAL INQUIRY TRANSCRIPT\n\nRespondent: Mina\n"));
        assert!(transcript.contains("Gender: unspecified\n"));
        let header_end = transcript.find("Interactions: 1").unwrap();
        let entry = transcript.find("image_modify").unwrap();
        assert!(entry > header_end);
        assert!(transcript.contains("Remix: brighter"));
    }
}
