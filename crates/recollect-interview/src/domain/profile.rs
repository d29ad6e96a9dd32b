//! Interview inputs: who the respondent is, what the scene is about, and the
//! visual context dials.

use serde::{Deserialize, Serialize};

const DEFAULT_NAME: &str = "the respondent";
const UNSPECIFIED: &str = "unspecified";
const NOT_SPECIFIED: &str = "not specified";

fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn or_not_specified(value: Option<&str>) -> &str {
    filled(value).unwrap_or(NOT_SPECIFIED)
}

/// The respondent whose experience is being reconstructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentProfile {
    /// Display name.
    pub name: Option<String>,
    /// Gender as the respondent describes it.
    pub gender: Option<String>,
    /// Age band, e.g. "20s".
    pub age: Option<String>,
}

impl RespondentProfile {
    /// Name, or a neutral placeholder when unanswered.
    #[must_use]
    pub fn name(&self) -> &str {
        filled(self.name.as_deref()).unwrap_or(DEFAULT_NAME)
    }

    /// Gender, or "unspecified".
    #[must_use]
    pub fn gender(&self) -> &str {
        filled(self.gender.as_deref()).unwrap_or(UNSPECIFIED)
    }

    /// Age band, or "unspecified".
    #[must_use]
    pub fn age(&self) -> &str {
        filled(self.age.as_deref()).unwrap_or(UNSPECIFIED)
    }

    /// File-system friendly identity used as the export root folder.
    #[must_use]
    pub fn folder_slug(&self) -> String {
        let slug: String = self
            .name()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let slug = slug.trim_matches('_').to_owned();
        if slug.is_empty() {
            "respondent".to_owned()
        } else {
            slug
        }
    }
}

/// The 5W1H description of the moment being reconstructed. Every field is
/// optional; prompts say "not specified" for the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTopic {
    /// Who was involved.
    pub who: Option<String>,
    /// What happened.
    pub what: Option<String>,
    /// When it happened.
    pub when: Option<String>,
    /// Where it happened.
    pub place: Option<String>,
    /// Why it happened.
    pub why: Option<String>,
    /// How it happened.
    pub how: Option<String>,
}

impl SceneTopic {
    /// Whether every field is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Filled fields as `(label, value)` pairs in display order: when, where,
    /// who, what, why, how.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("When", self.when.as_deref()),
            ("Where", self.place.as_deref()),
            ("Who", self.who.as_deref()),
            ("What", self.what.as_deref()),
            ("Why", self.why.as_deref()),
            ("How", self.how.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| filled(value).map(|v| (label, v)))
        .collect()
    }

    /// One prompt line per question, "not specified" where blank. `who`
    /// falls back to the respondent's name.
    #[must_use]
    pub fn prompt_lines(&self, profile: &RespondentProfile) -> String {
        format!(
            "- Who: {}\n- What: {}\n- When: {}\n- Where: {}\n- Why: {}\n- How: {}",
            filled(self.who.as_deref()).unwrap_or(profile.name()),
            or_not_specified(self.what.as_deref()),
            or_not_specified(self.when.as_deref()),
            or_not_specified(self.place.as_deref()),
            or_not_specified(self.why.as_deref()),
            or_not_specified(self.how.as_deref()),
        )
    }

    /// Location used for panoramas.
    #[must_use]
    pub fn location(&self) -> &str {
        filled(self.place.as_deref()).unwrap_or("the place described in the scene")
    }
}

/// A three-step dial value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Step 0.
    Low,
    /// Step 1.
    #[default]
    Medium,
    /// Step 2.
    High,
}

impl Level {
    /// Maps a 0–2 step onto a level. Anything else is rejected.
    #[must_use]
    pub fn from_step(step: i64) -> Option<Self> {
        match step {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    /// The 0–2 step.
    #[must_use]
    pub fn step(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

/// Visual context dials applied to illustrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextParameters {
    /// Lighting: dark, normal, bright.
    pub light: Level,
    /// Crowd density: quiet, normal, crowded.
    pub people: Level,
    /// Camera distance: close-up, medium, wide.
    pub distance: Level,
}

impl ContextParameters {
    /// Label shown next to the lighting dial.
    #[must_use]
    pub fn light_label(&self) -> &'static str {
        match self.light {
            Level::Low => "dark",
            Level::Medium => "normal",
            Level::High => "bright",
        }
    }

    /// Label shown next to the crowd dial.
    #[must_use]
    pub fn people_label(&self) -> &'static str {
        match self.people {
            Level::Low => "quiet",
            Level::Medium => "normal",
            Level::High => "crowded",
        }
    }

    /// Label shown next to the distance dial.
    #[must_use]
    pub fn distance_label(&self) -> &'static str {
        match self.distance {
            Level::Low => "close-up",
            Level::Medium => "medium",
            Level::High => "wide",
        }
    }

    /// Camera direction derived from the distance dial.
    #[must_use]
    pub fn camera_angle(&self) -> &'static str {
        match self.distance {
            Level::Low => "Close-Up Shot",
            Level::Medium => "Medium Shot",
            Level::High => "Wide Shot",
        }
    }

    /// Natural-language environment summary for image prompts.
    #[must_use]
    pub fn summary(&self) -> String {
        let light = match self.light {
            Level::Low => "dim, calm lighting",
            Level::Medium => "natural everyday lighting",
            Level::High => "bright, vivid lighting",
        };
        let people = match self.people {
            Level::Low => "almost nobody around, a quiet setting",
            Level::Medium => "an everyday number of people around",
            Level::High => "a lively place crowded with people",
        };
        format!("{light}, {people}")
    }
}
