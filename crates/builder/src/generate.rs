use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use keyscroll_domain::{is_sharp, Hand, NoteEvent, ScorePosition, Tempo, Timeline};

use crate::error::BuildError;

/// Slack for comparing accumulated beat positions.
const BEAT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HandRange {
    pub hand: Hand,
    pub low: u8,
    pub high: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub hands: Vec<HandRange>,
    /// Notes generated per hand.
    pub count: usize,
    pub tempo_bpm: f64,
    pub beats_per_measure: u8,
    pub include_sharps: bool,
    /// Allowed note lengths in beats.
    pub durations: Vec<f64>,
    /// Gap inserted after every note, in beats.
    pub spacing_beats: f64,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            hands: vec![HandRange {
                hand: Hand::Right,
                low: 60,
                high: 72,
            }],
            count: 16,
            tempo_bpm: 80.0,
            beats_per_measure: 4,
            include_sharps: false,
            durations: vec![0.5, 1.0, 2.0],
            spacing_beats: 0.0,
            seed: None,
        }
    }
}

pub struct RandomGenerator {
    config: GeneratorConfig,
    tempo: Tempo,
}

impl RandomGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, BuildError> {
        let tempo = Tempo::new(config.tempo_bpm, (config.beats_per_measure, 4))?;
        if config.hands.is_empty() {
            return Err(BuildError::config("at least one hand range is required"));
        }
        if config.durations.is_empty() {
            return Err(BuildError::config("duration set must not be empty"));
        }
        if config.durations.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(BuildError::config("durations must be positive beats"));
        }
        if !config.spacing_beats.is_finite() || config.spacing_beats < 0.0 {
            return Err(BuildError::config("spacing must be zero or more beats"));
        }
        for range in &config.hands {
            if range.low > range.high || range.high > keyscroll_domain::pitch::MAX_PITCH {
                return Err(BuildError::config(format!(
                    "invalid pitch range {}..={} for {:?} hand",
                    range.low, range.high, range.hand
                )));
            }
            if pitch_pool(range, config.include_sharps).is_empty() {
                return Err(BuildError::config(format!(
                    "no playable pitches in {}..={} for {:?} hand",
                    range.low, range.high, range.hand
                )));
            }
        }
        Ok(Self { config, tempo })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate with the configured seed, or from entropy when none is set.
    pub fn generate(&self) -> Timeline {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate_with(&mut rng)
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Timeline {
        let beats_per_measure = self.tempo.beats_per_measure();
        let mut notes = Vec::with_capacity(self.config.count * self.config.hands.len());

        for range in &self.config.hands {
            let pool = pitch_pool(range, self.config.include_sharps);
            let mut cursor = 0.0_f64;
            for _ in 0..self.config.count {
                let Some(&pitch) = pool.choose(rng) else {
                    break;
                };
                let mut remaining = beats_per_measure - cursor.rem_euclid(beats_per_measure);
                if remaining <= BEAT_EPSILON {
                    remaining = beats_per_measure;
                }
                let fitting: Vec<f64> = self
                    .config
                    .durations
                    .iter()
                    .copied()
                    .filter(|d| *d <= remaining + BEAT_EPSILON)
                    .collect();
                let duration = fitting.choose(rng).copied().unwrap_or(remaining);

                notes.push(
                    NoteEvent::new(self.tempo.beats_to_seconds(cursor), Some(pitch), duration)
                        .with_position(ScorePosition::from_beats(cursor, beats_per_measure))
                        .with_hand(range.hand),
                );
                cursor += duration + self.config.spacing_beats;
            }
            debug!(hand = ?range.hand, end_beat = cursor, "generated hand");
        }

        Timeline::new(notes, self.tempo)
    }
}

fn pitch_pool(range: &HandRange, include_sharps: bool) -> Vec<u8> {
    (range.low..=range.high)
        .filter(|pitch| include_sharps || !is_sharp(*pitch))
        .collect()
}
