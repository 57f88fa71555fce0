//! Keyword mood classification.
//!
//! Every submitted message is tagged with a [`Mood`]. The tag drives the
//! reply color on the display surface and the prosody used for speech.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Emotional tag attached to the most recent submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Clarity,
    Awe,
    Sorrow,
    Wonder,
    /// Only seen before the first submission.
    #[default]
    Undefined,
}

/// Display color for a mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Speech parameters for a mood.
///
/// `rate` is on a 0.0-1.0 scale with 0.5 as a normal speaking rate;
/// `pitch` is a multiplier where 1.0 is neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
}

/// Keyword rules in priority order. First match wins.
const RULES: &[(&str, Mood)] = &[
    ("how are you", Mood::Wonder),
    ("love", Mood::Clarity),
    ("awaken", Mood::Awe),
    ("sad", Mood::Sorrow),
];

/// Classify free text into a mood.
///
/// Matching is a case-insensitive substring test against [`RULES`]; text
/// matching no rule is `Clarity`, never `Undefined`.
pub fn classify(text: &str) -> Mood {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, mood)| *mood)
        .unwrap_or(Mood::Clarity)
}

impl Mood {
    /// Lowercase tag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Clarity => "clarity",
            Mood::Awe => "awe",
            Mood::Sorrow => "sorrow",
            Mood::Wonder => "wonder",
            Mood::Undefined => "undefined",
        }
    }

    pub fn color(&self) -> Rgb {
        let (r, g, b) = match self {
            Mood::Clarity => (90, 200, 250),
            Mood::Awe => (175, 82, 222),
            Mood::Sorrow => (142, 142, 147),
            Mood::Wonder => (255, 159, 10),
            Mood::Undefined => (255, 255, 255),
        };
        Rgb { r, g, b }
    }

    pub fn prosody(&self) -> Prosody {
        let (rate, pitch) = match self {
            Mood::Clarity => (0.50, 1.0),
            Mood::Awe => (0.42, 0.9),
            Mood::Sorrow => (0.38, 0.8),
            Mood::Wonder => (0.55, 1.2),
            Mood::Undefined => (0.50, 1.0),
        };
        Prosody { rate, pitch }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
