//! Day-by-day warming progression curve.
//!
//! A freshly warmed instance starts with a handful of plain text messages per
//! day and ramps up to a few hundred mixed-media messages over three weeks.
//! The curve is a fixed, hand-tuned step table: both volume bounds and the
//! set of unlocked content types only ever increase with the day, and the
//! curve plateaus at day 21.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// Kind of content a warming message can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Image,
    Audio,
    Video,
}

impl ContentType {
    /// Stable string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Parse the database string form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    /// Activity type recorded in the warming audit log for a send of this
    /// content kind, e.g. `"send_text"`.
    pub fn activity_type(self) -> &'static str {
        match self {
            Self::Text => "send_text",
            Self::Image => "send_image",
            Self::Audio => "send_audio",
            Self::Video => "send_video",
        }
    }
}

// ---------------------------------------------------------------------------
// Progression table
// ---------------------------------------------------------------------------

/// The warming curve plateaus after this day: `progression_for(d)` for any
/// `d > 21` returns the day-21 row.
pub const PLATEAU_DAY: i32 = 21;

const TEXT_ONLY: &[ContentType] = &[ContentType::Text];
const THROUGH_IMAGE: &[ContentType] = &[ContentType::Text, ContentType::Image];
const THROUGH_AUDIO: &[ContentType] = &[
    ContentType::Text,
    ContentType::Image,
    ContentType::Audio,
];
const ALL_TYPES: &[ContentType] = &[
    ContentType::Text,
    ContentType::Image,
    ContentType::Audio,
    ContentType::Video,
];

/// One row of the progression curve: the daily volume bounds and the content
/// types unlocked on that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayProgression {
    /// Minimum messages to aim for on this day.
    pub min: i32,
    /// Maximum messages allowed on this day.
    pub max: i32,
    /// Content types the instance may send on this day.
    pub allowed_types: &'static [ContentType],
}

/// Look up the progression row for a warming day.
///
/// The input day is clamped to `[1, 21]`: days below 1 behave like day 1 and
/// days beyond the plateau behave like day 21. Image content unlocks on
/// day 3, audio on day 5, video on day 15.
pub fn progression_for(day: i32) -> DayProgression {
    let day = day.clamp(1, PLATEAU_DAY);
    match day {
        1..=2 => DayProgression {
            min: 5,
            max: 10,
            allowed_types: TEXT_ONLY,
        },
        3..=4 => DayProgression {
            min: 10,
            max: 20,
            allowed_types: THROUGH_IMAGE,
        },
        5..=6 => DayProgression {
            min: 20,
            max: 35,
            allowed_types: THROUGH_AUDIO,
        },
        7..=9 => DayProgression {
            min: 35,
            max: 50,
            allowed_types: THROUGH_AUDIO,
        },
        10..=12 => DayProgression {
            min: 50,
            max: 80,
            allowed_types: THROUGH_AUDIO,
        },
        13..=14 => DayProgression {
            min: 70,
            max: 110,
            allowed_types: THROUGH_AUDIO,
        },
        15..=17 => DayProgression {
            min: 90,
            max: 140,
            allowed_types: ALL_TYPES,
        },
        18..=20 => DayProgression {
            min: 120,
            max: 200,
            allowed_types: ALL_TYPES,
        },
        _ => DayProgression {
            min: 150,
            max: 250,
            allowed_types: ALL_TYPES,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
