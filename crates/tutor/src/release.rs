use serde::{Deserialize, Serialize};

use crate::context::ActivePress;

/// Minimum release tolerance in beats; longer notes get 20% of their length.
const MIN_RELEASE_TOLERANCE_BEATS: f64 = 0.2;
const RELEASE_TOLERANCE_RATIO: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    PerfectRelease,
    EarlyRelease,
    LateRelease,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReleaseVerdict {
    pub index: usize,
    pub kind: ReleaseKind,
    pub held_beats: f64,
    pub expected_beats: f64,
}

pub fn release_tolerance(expected_beats: f64) -> f64 {
    MIN_RELEASE_TOLERANCE_BEATS.max(expected_beats * RELEASE_TOLERANCE_RATIO)
}

pub fn classify_release(held_beats: f64, expected_beats: f64) -> ReleaseKind {
    let tolerance = release_tolerance(expected_beats);
    if (held_beats - expected_beats).abs() <= tolerance {
        ReleaseKind::PerfectRelease
    } else if held_beats < expected_beats {
        ReleaseKind::EarlyRelease
    } else {
        ReleaseKind::LateRelease
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReleaseValidator {
    enforce_duration: bool,
}

impl ReleaseValidator {
    pub fn new(enforce_duration: bool) -> Self {
        Self { enforce_duration }
    }

    /// No verdict when duration checks are off or the key was never matched.
    pub fn validate(
        &self,
        position_beats: f64,
        press: Option<&ActivePress>,
    ) -> Option<ReleaseVerdict> {
        if !self.enforce_duration {
            return None;
        }
        let press = press?;
        let held_beats = position_beats - press.start_beat;
        Some(ReleaseVerdict {
            index: press.index,
            kind: classify_release(held_beats, press.duration_beats),
            held_beats,
            expected_beats: press.duration_beats,
        })
    }
}
