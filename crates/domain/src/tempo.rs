use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "TempoData")]
pub struct Tempo {
    /// Beats per minute.
    pub bpm: f64,
    /// Time signature represented as (numerator, denominator).
    pub signature: (u8, u8),
}

#[derive(Deserialize)]
struct TempoData {
    bpm: f64,
    signature: (u8, u8),
}

impl TryFrom<TempoData> for Tempo {
    type Error = DomainError;

    fn try_from(data: TempoData) -> Result<Self, Self::Error> {
        Tempo::new(data.bpm, data.signature)
    }
}

impl Tempo {
    pub fn new(bpm: f64, signature: (u8, u8)) -> Result<Self, DomainError> {
        if !(10.0..=400.0).contains(&bpm) {
            return Err(DomainError::validation(
                "tempo bpm must be between 10 and 400",
            ));
        }
        if signature.0 == 0 || !signature.1.is_power_of_two() {
            return Err(DomainError::validation(
                "time signature denominator must be power of two",
            ));
        }
        Ok(Self { bpm, signature })
    }

    pub fn constant(bpm: f64) -> Result<Self, DomainError> {
        Self::new(bpm, (4, 4))
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    pub fn beats_per_second(&self) -> f64 {
        self.bpm / 60.0
    }

    pub fn beats_per_measure(&self) -> f64 {
        f64::from(self.signature.0)
    }

    pub fn beats_to_seconds(&self, beats: f64) -> f64 {
        beats * self.seconds_per_beat()
    }

    pub fn seconds_to_beats(&self, seconds: f64) -> f64 {
        seconds * self.beats_per_second()
    }
}
