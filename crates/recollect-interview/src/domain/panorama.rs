//! Per-scene panorama cache.

use std::collections::HashMap;

use recollect_core::image::ImageRef;

/// Generated panoramas keyed by scene number. Remixes of a scene share its
/// panorama unless a refresh replaces it.
#[derive(Debug, Clone, Default)]
pub struct PanoramaCache {
    entries: HashMap<u32, ImageRef>,
}

impl PanoramaCache {
    /// Cached panorama for `scene`.
    #[must_use]
    pub fn get(&self, scene: u32) -> Option<&ImageRef> {
        self.entries.get(&scene)
    }

    /// Stores (or overwrites) the panorama for `scene`.
    pub fn insert(&mut self, scene: u32, panorama: ImageRef) {
        self.entries.insert(scene, panorama);
    }

    /// Number of cached scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
