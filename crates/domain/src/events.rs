use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pitch::pitch_name;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
}

/// Measure/beat coordinates of a note, 1-indexed like a printed score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScorePosition {
    pub measure: u32,
    pub beat: u32,
    pub beat_fraction: f64,
}

impl ScorePosition {
    pub fn from_beats(total_beats: f64, beats_per_measure: f64) -> Self {
        let total = total_beats.max(0.0);
        let measure_index = (total / beats_per_measure).floor();
        let within = total - measure_index * beats_per_measure;
        let whole = within.floor();
        Self {
            measure: measure_index as u32 + 1,
            beat: whole as u32 + 1,
            beat_fraction: within - whole,
        }
    }
}

/// Canonical field names of a [`NoteEvent`]; preserved record fields never reuse them.
pub const CANONICAL_FIELDS: [&str; 7] = [
    "start",
    "pitchIdentifier",
    "durationBeats",
    "measure",
    "beat",
    "beatFraction",
    "hand",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    /// Seconds from session start at which the playhead reaches this note.
    pub start: f64,
    /// Chromatic pitch number, `None` when the source record could not be resolved.
    pub pitch_identifier: Option<u8>,
    pub duration_beats: f64,
    pub measure: u32,
    pub beat: u32,
    pub beat_fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Hand>,
    /// Fields carried over untouched from an externally parsed record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NoteEvent {
    pub fn new(start: f64, pitch_identifier: Option<u8>, duration_beats: f64) -> Self {
        Self {
            start,
            pitch_identifier,
            duration_beats,
            measure: 1,
            beat: 1,
            beat_fraction: 0.0,
            hand: None,
            extra: Map::new(),
        }
    }

    pub fn with_position(mut self, position: ScorePosition) -> Self {
        self.measure = position.measure;
        self.beat = position.beat;
        self.beat_fraction = position.beat_fraction;
        self
    }

    pub fn with_hand(mut self, hand: Hand) -> Self {
        self.hand = Some(hand);
        self
    }

    pub fn start_beats(&self, seconds_per_beat: f64) -> f64 {
        self.start / seconds_per_beat
    }

    pub fn is_rest(&self) -> bool {
        self.pitch_identifier.is_none()
    }

    pub fn label(&self) -> String {
        self.pitch_identifier
            .map(pitch_name)
            .unwrap_or_else(|| "rest".to_string())
    }
}
