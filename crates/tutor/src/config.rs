use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TutorError;

/// Shortest accepted bounce guard for repeated note-on delivery.
pub const MIN_DEBOUNCE_MS: u64 = 50;

/// Every tunable of a practice session. Missing fields fall back to defaults
/// so partial settings files keep working.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TutorConfig {
    /// Tempo used when no lesson is loaded and for generated exercises.
    pub tempo_bpm: f64,
    /// Practice multiplier; higher values slow playback down.
    pub speed_factor: f64,
    /// Scale between beats and clock position units.
    pub pixels_per_beat: f64,
    pub strict_tolerance_beats: f64,
    pub wide_tolerance_beats: f64,
    /// Added to the wide tolerance before the watchdog may call a note missed.
    pub miss_buffer_beats: f64,
    pub revalidation_window_ms: u64,
    pub debounce_ms: u64,
    pub enforce_duration: bool,
    pub watchdog_interval_ms: u64,
    pub tick_interval_ms: u64,
    pub pulse_ms: u64,
    /// Count-in before the first note, in beats.
    pub lead_in_beats: f64,
    /// Let notes without a pitch (rests) be counted as missed.
    pub count_unpitched_misses: bool,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: 80.0,
            speed_factor: 1.0,
            pixels_per_beat: 100.0,
            strict_tolerance_beats: 0.1,
            wide_tolerance_beats: 0.45,
            miss_buffer_beats: 6.0,
            revalidation_window_ms: 500,
            debounce_ms: 50,
            enforce_duration: true,
            watchdog_interval_ms: 200,
            tick_interval_ms: 16,
            pulse_ms: 220,
            lead_in_beats: 4.0,
            count_unpitched_misses: false,
        }
    }
}

impl TutorConfig {
    pub fn validate(&self) -> Result<(), TutorError> {
        let positive = [
            ("tempo_bpm", self.tempo_bpm),
            ("speed_factor", self.speed_factor),
            ("pixels_per_beat", self.pixels_per_beat),
            ("strict_tolerance_beats", self.strict_tolerance_beats),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TutorError::config(format!("{name} must be positive")));
            }
        }
        if self.wide_tolerance_beats < self.strict_tolerance_beats {
            return Err(TutorError::config(
                "wide tolerance must not be narrower than the strict tolerance",
            ));
        }
        if self.miss_buffer_beats < 0.0 || self.lead_in_beats < 0.0 {
            return Err(TutorError::config(
                "miss buffer and lead-in must not be negative",
            ));
        }
        if self.debounce_ms < MIN_DEBOUNCE_MS {
            return Err(TutorError::config(format!(
                "debounce_ms must be at least {MIN_DEBOUNCE_MS}"
            )));
        }
        if self.watchdog_interval_ms == 0 || self.tick_interval_ms == 0 {
            return Err(TutorError::config("scheduler intervals must be non-zero"));
        }
        Ok(())
    }

    pub fn miss_threshold_beats(&self) -> f64 {
        self.wide_tolerance_beats + self.miss_buffer_beats
    }

    pub fn revalidation_window(&self) -> Duration {
        Duration::from_millis(self.revalidation_window_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
