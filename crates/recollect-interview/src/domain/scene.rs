//! Scene identities, committed records and the mutable working state.

use std::fmt;

use recollect_core::image::ImageRef;
use serde::{Deserialize, Serialize};

use super::keywords::KeywordSets;

/// Opaque, strictly increasing, timestamp-like scene identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(u64);

impl SceneId {
    /// Wraps a raw id.
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out scene ids from clock milliseconds, bumped so that two commits
/// in the same millisecond still get distinct, increasing ids.
#[derive(Debug, Clone, Default)]
pub struct SceneIdGenerator {
    last: u64,
}

impl SceneIdGenerator {
    /// Next id given the current clock reading.
    pub fn next_id(&mut self, now_millis: i64) -> SceneId {
        let now = u64::try_from(now_millis).unwrap_or(0);
        self.last = now.max(self.last + 1);
        SceneId(self.last)
    }
}

/// `(scene, variation)` pair naming a scene and its visual remixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneKey {
    /// Scene number, starting at 1.
    pub scene: u32,
    /// Variation within the scene, starting at 1.
    pub variation: u32,
}

impl SceneKey {
    /// The first variation of the first scene.
    pub const FIRST: Self = Self {
        scene: 1,
        variation: 1,
    };

    /// Builds a key.
    #[must_use]
    pub fn new(scene: u32, variation: u32) -> Self {
        Self { scene, variation }
    }

    /// File stem used in exports, `scene_<s>_<v>`.
    #[must_use]
    pub fn file_stem(self) -> String {
        format!("scene_{}_{}", self.scene, self.variation)
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.scene, self.variation)
    }
}

/// One committed scene. Content never changes after append, apart from the
/// panorama slot which may be filled once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneRecord {
    /// Record id.
    pub id: SceneId,
    /// Scene and variation numbers.
    pub key: SceneKey,
    /// Local timestamp label, informational only.
    pub created_at: String,
    /// The illustration.
    pub image: ImageRef,
    /// The 360° panorama, if one was generated.
    pub panorama: Option<ImageRef>,
    /// Narrative at commit time.
    pub narrative: String,
    /// Image prompt that produced `image`.
    pub prompt_used: String,
    /// Keyword sets at commit time.
    pub keywords: KeywordSets,
}

/// The single mutable working set of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentSceneState {
    /// Current narrative.
    pub narrative: String,
    /// Current keyword sets.
    pub keywords: KeywordSets,
    /// Currently selected deep question.
    pub selected_question: Option<String>,
    /// Current illustration.
    pub image: Option<ImageRef>,
    /// Current panorama.
    pub panorama: Option<ImageRef>,
    /// Prompt behind the current illustration.
    pub prompt: String,
    /// Key of the scene being worked on.
    pub key: Option<SceneKey>,
    /// Whether at least one scene has been committed.
    pub committed: bool,
}

impl CurrentSceneState {
    /// Copies a committed record into the working state. The selected
    /// question is left alone.
    pub fn load_record(&mut self, record: &SceneRecord) {
        self.narrative.clone_from(&record.narrative);
        self.keywords = record.keywords.clone();
        self.image = Some(record.image.clone());
        self.panorama.clone_from(&record.panorama);
        self.prompt.clone_from(&record.prompt_used);
        self.key = Some(record.key);
        self.committed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator_stays_strictly_increasing() {
        // Arrange
        let mut ids = SceneIdGenerator::default();

        // Act
        let first = ids.next_id(1_000);
        let same_millisecond = ids.next_id(1_000);
        let clock_went_back = ids.next_id(900);
        let later = ids.next_id(5_000);

        // Assert
        assert_eq!(first.value(), 1_000);
        assert_eq!(same_millisecond.value(), 1_001);
        assert_eq!(clock_went_back.value(), 1_002);
        assert_eq!(later.value(), 5_000);
    }

    #[test]
    fn test_key_file_stem() {
        assert_eq!(SceneKey::new(2, 3).file_stem(), "scene_2_3");
        assert_eq!(SceneKey::FIRST.to_string(), "1-1");
    }
}
