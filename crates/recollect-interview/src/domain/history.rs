//! Append-only scene history.

use recollect_core::error::DomainError;
use recollect_core::image::ImageRef;
use serde::Serialize;

use super::scene::{CurrentSceneState, SceneId, SceneKey, SceneRecord};

const PREVIEW_CHARS: usize = 80;

/// Ordered list of committed scenes. Records are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct SceneHistory {
    records: Vec<SceneRecord>,
}

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntryView {
    /// Record id, used to restore.
    pub id: SceneId,
    /// Scene and variation numbers.
    pub key: SceneKey,
    /// Local timestamp label.
    pub created_at: String,
    /// Thumbnail locator.
    pub thumbnail: String,
    /// Whether a panorama exists for the record.
    pub has_panorama: bool,
    /// Start of the narrative.
    pub preview: String,
}

impl SceneHistory {
    /// Deep-copies the working state into a new record and appends it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the working state has no image.
    pub fn commit(
        &mut self,
        id: SceneId,
        key: SceneKey,
        created_at: String,
        snapshot: &CurrentSceneState,
    ) -> Result<&SceneRecord, DomainError> {
        let image = snapshot
            .image
            .clone()
            .ok_or_else(|| DomainError::Validation("cannot commit a scene without an image".into()))?;
        self.records.push(SceneRecord {
            id,
            key,
            created_at,
            image,
            panorama: snapshot.panorama.clone(),
            narrative: snapshot.narrative.clone(),
            prompt_used: snapshot.prompt.clone(),
            keywords: snapshot.keywords.clone(),
        });
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Looks a record up by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SceneNotFound` for unknown ids.
    pub fn get(&self, id: SceneId) -> Result<&SceneRecord, DomainError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(DomainError::SceneNotFound(id.value()))
    }

    /// Most recent record whose illustration is `image`.
    #[must_use]
    pub fn find_by_image(&self, image: &ImageRef) -> Option<&SceneRecord> {
        self.records.iter().rev().find(|r| &r.image == image)
    }

    /// Fills the panorama slot of a record that has none yet. Returns whether
    /// the slot was filled; an existing panorama is never replaced.
    pub fn attach_panorama(&mut self, id: SceneId, panorama: &ImageRef) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) if record.panorama.is_none() => {
                record.panorama = Some(panorama.clone());
                true
            }
            _ => false,
        }
    }

    /// Records in commit order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SceneRecord> {
        self.records.iter()
    }

    /// Records most-recent-first, as the history list shows them.
    pub fn iter_recent(&self) -> impl Iterator<Item = &SceneRecord> {
        self.records.iter().rev()
    }

    /// The last record appended for each key, in the order each key first
    /// appeared.
    #[must_use]
    pub fn latest_per_key(&self) -> Vec<&SceneRecord> {
        let mut keys: Vec<SceneKey> = Vec::new();
        for record in &self.records {
            if !keys.contains(&record.key) {
                keys.push(record.key);
            }
        }
        keys.into_iter()
            .filter_map(|key| self.records.iter().rev().find(|r| r.key == key))
            .collect()
    }

    /// The newest record.
    #[must_use]
    pub fn latest(&self) -> Option<&SceneRecord> {
        self.records.last()
    }

    /// Highest scene number committed so far, 0 when empty.
    #[must_use]
    pub fn max_scene(&self) -> u32 {
        self.records.iter().map(|r| r.key.scene).max().unwrap_or(0)
    }

    /// Highest variation committed for `scene`, 0 when none.
    #[must_use]
    pub fn max_variation(&self, scene: u32) -> u32 {
        self.records
            .iter()
            .filter(|r| r.key.scene == scene)
            .map(|r| r.key.variation)
            .max()
            .unwrap_or(0)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders the history list, most-recent-first.
    #[must_use]
    pub fn render(&self) -> Vec<HistoryEntryView> {
        self.iter_recent()
            .map(|r| HistoryEntryView {
                id: r.id,
                key: r.key,
                created_at: r.created_at.clone(),
                thumbnail: r.image.data_uri(),
                has_panorama: r.panorama.is_some(),
                preview: preview(&r.narrative),
            })
            .collect()
    }
}

fn preview(narrative: &str) -> String {
    let mut chars = narrative.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: &str) -> ImageRef {
        ImageRef::from_bytes("image/png", tag.as_bytes()).unwrap()
    }

    fn state(narrative: &str, tag: &str) -> CurrentSceneState {
        CurrentSceneState {
            narrative: narrative.to_owned(),
            image: Some(image(tag)),
            ..CurrentSceneState::default()
        }
    }

    #[test]
    fn test_commit_copies_working_state() {
        // Arrange
        let mut history = SceneHistory::default();
        let mut working = state("first", "a");

        // Act
        history
            .commit(SceneId::new(1), SceneKey::FIRST, "now".into(), &working)
            .unwrap();
        working.narrative.push_str(" and more");

        // Assert
        assert_eq!(history.get(SceneId::new(1)).unwrap().narrative, "first");
    }

    #[test]
    fn test_commit_without_image_is_rejected() {
        let mut history = SceneHistory::default();

        let result = history.commit(
            SceneId::new(1),
            SceneKey::FIRST,
            "now".into(),
            &CurrentSceneState::default(),
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(history.is_empty());
    }

    #[test]
    fn test_get_unknown_id_fails() {
        let history = SceneHistory::default();

        let result = history.get(SceneId::new(42));

        assert!(matches!(result, Err(DomainError::SceneNotFound(42))));
    }

    #[test]
    fn test_latest_per_key_keeps_newest_in_first_appearance_order() {
        // Arrange
        let mut history = SceneHistory::default();
        history
            .commit(SceneId::new(1), SceneKey::new(1, 1), "t".into(), &state("one", "a"))
            .unwrap();
        history
            .commit(SceneId::new(2), SceneKey::new(2, 1), "t".into(), &state("two", "b"))
            .unwrap();
        history
            .commit(SceneId::new(3), SceneKey::new(1, 1), "t".into(), &state("one again", "c"))
            .unwrap();

        // Act
        let latest = history.latest_per_key();

        // Assert
        let ids: Vec<u64> = latest.iter().map(|r| r.id.value()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_attach_panorama_is_set_once() {
        // Arrange
        let mut history = SceneHistory::default();
        history
            .commit(SceneId::new(1), SceneKey::FIRST, "t".into(), &state("one", "a"))
            .unwrap();

        // Act
        let first = history.attach_panorama(SceneId::new(1), &image("pano-1"));
        let second = history.attach_panorama(SceneId::new(1), &image("pano-2"));

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(
            history.get(SceneId::new(1)).unwrap().panorama,
            Some(image("pano-1"))
        );
    }

    #[test]
    fn test_render_is_most_recent_first_and_find_by_image() {
        // Arrange
        let mut history = SceneHistory::default();
        history
            .commit(SceneId::new(1), SceneKey::new(1, 1), "t".into(), &state("one", "a"))
            .unwrap();
        history
            .commit(SceneId::new(2), SceneKey::new(1, 2), "t".into(), &state("two", "b"))
            .unwrap();

        // Act
        let rows = history.render();

        // Assert
        assert_eq!(rows[0].id, SceneId::new(2));
        assert_eq!(rows[1].id, SceneId::new(1));
        assert_eq!(history.find_by_image(&image("a")).unwrap().id, SceneId::new(1));
        assert_eq!(history.max_variation(1), 2);
        assert_eq!(history.max_scene(), 1);
    }
}
