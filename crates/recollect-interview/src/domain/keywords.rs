//! Keyword sets and the keyword panel model.

use recollect_core::generation::GenerationError;
use serde::{Deserialize, Serialize};

/// Minimum usable entries per keyword set.
pub const MIN_KEYWORDS: usize = 3;
/// Entries beyond this are dropped.
pub const MAX_KEYWORDS: usize = 5;

/// The three labeled keyword sets attached to a narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSets {
    /// Key emotions.
    pub emotions: Vec<String>,
    /// Atmosphere / mood.
    pub atmosphere: Vec<String>,
    /// Key visual or contextual elements.
    pub elements: Vec<String>,
}

impl KeywordSets {
    /// Validates raw generator output: trims labels, drops blanks, requires at
    /// least [`MIN_KEYWORDS`] per set and keeps at most [`MAX_KEYWORDS`].
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::TooFewEntries` naming the first set that is
    /// short.
    pub fn validated(
        emotions: Vec<String>,
        atmosphere: Vec<String>,
        elements: Vec<String>,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            emotions: clean("key_emotions", emotions)?,
            atmosphere: clean("atmosphere", atmosphere)?,
            elements: clean("key_elements", elements)?,
        })
    }

    /// Whether all three sets are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty() && self.atmosphere.is_empty() && self.elements.is_empty()
    }

    /// The sets in panel order.
    #[must_use]
    pub fn as_slices(&self) -> [&[String]; 3] {
        [&self.emotions, &self.atmosphere, &self.elements]
    }
}

fn clean(field: &'static str, labels: Vec<String>) -> Result<Vec<String>, GenerationError> {
    let mut usable: Vec<String> = labels
        .into_iter()
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
        .collect();
    if usable.len() < MIN_KEYWORDS {
        return Err(GenerationError::TooFewEntries {
            field,
            found: usable.len(),
            required: MIN_KEYWORDS,
        });
    }
    usable.truncate(MAX_KEYWORDS);
    Ok(usable)
}

/// Presentation model for the keyword panel: the current sets plus whether
/// the panel is collapsed. Starts collapsed and opens on the first update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPanel {
    sets: KeywordSets,
    collapsed: bool,
}

impl Default for KeywordPanel {
    fn default() -> Self {
        Self {
            sets: KeywordSets::default(),
            collapsed: true,
        }
    }
}

/// Rendered keyword panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordPanelView {
    /// Emotion tags.
    pub emotions: Vec<String>,
    /// Atmosphere tags.
    pub atmosphere: Vec<String>,
    /// Element tags.
    pub elements: Vec<String>,
    /// Whether the panel is collapsed.
    pub collapsed: bool,
}

impl KeywordPanel {
    /// Replaces the displayed sets and un-collapses the panel.
    pub fn update(&mut self, sets: &KeywordSets) {
        self.sets = sets.clone();
        self.collapsed = false;
    }

    /// Replaces the displayed sets without touching the collapsed state.
    pub(crate) fn show(&mut self, sets: &KeywordSets) {
        self.sets = sets.clone();
    }

    /// Flips the collapsed state.
    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Whether the panel is collapsed.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Renders the panel.
    #[must_use]
    pub fn render(&self) -> KeywordPanelView {
        KeywordPanelView {
            emotions: self.sets.emotions.clone(),
            atmosphere: self.sets.atmosphere.clone(),
            elements: self.sets.elements.clone(),
            collapsed: self.collapsed,
        }
    }
}
