use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::Verdict;
use crate::scoring::ScoreBoard;

/// One judged event, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Judgement {
    Hit {
        index: usize,
        pitch: u8,
        offset_beats: f64,
    },
    Wrong {
        pitch: u8,
        expected_index: usize,
    },
    Extra {
        pitch: u8,
    },
    Missed {
        index: usize,
        pitch: Option<u8>,
    },
}

impl Judgement {
    pub fn from_verdict(pitch: u8, verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Correct {
                index,
                offset_beats,
            } => Judgement::Hit {
                index: *index,
                pitch,
                offset_beats: *offset_beats,
            },
            Verdict::Wrong { expected_index, .. } => Judgement::Wrong {
                pitch,
                expected_index: *expected_index,
            },
            Verdict::Extra => Judgement::Extra { pitch },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PitchTally {
    pub hits: u32,
    pub wrong: u32,
    pub missed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    pub accuracy: f64,
    pub early_hits: usize,
    pub late_hits: usize,
    pub mean_offset_beats: f64,
    /// Keyed by played pitch for hits and wrong notes, expected pitch for misses.
    pub per_pitch: BTreeMap<u8, PitchTally>,
}

impl PerformanceReport {
    pub fn empty() -> Self {
        Self {
            accuracy: 0.0,
            early_hits: 0,
            late_hits: 0,
            mean_offset_beats: 0.0,
            per_pitch: BTreeMap::new(),
        }
    }
}

pub struct SessionAnalytics;

impl SessionAnalytics {
    pub fn report(score: &ScoreBoard, judgements: &[Judgement]) -> PerformanceReport {
        let mut report = PerformanceReport::empty();
        report.accuracy = score.accuracy();
        let mut offsets = Vec::new();
        for judgement in judgements {
            match judgement {
                Judgement::Hit {
                    pitch,
                    offset_beats,
                    ..
                } => {
                    report.per_pitch.entry(*pitch).or_default().hits += 1;
                    offsets.push(*offset_beats);
                    if *offset_beats < 0.0 {
                        report.early_hits += 1;
                    } else if *offset_beats > 0.0 {
                        report.late_hits += 1;
                    }
                }
                Judgement::Wrong { pitch, .. } | Judgement::Extra { pitch } => {
                    report.per_pitch.entry(*pitch).or_default().wrong += 1;
                }
                Judgement::Missed {
                    pitch: Some(pitch), ..
                } => {
                    report.per_pitch.entry(*pitch).or_default().missed += 1;
                }
                Judgement::Missed { pitch: None, .. } => {}
            }
        }
        if !offsets.is_empty() {
            report.mean_offset_beats = offsets.iter().sum::<f64>() / offsets.len() as f64;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn analytics_splits_early_and_late() {
        let mut score = ScoreBoard::new();
        score.hits = 2;
        score.wrong_notes = 1;
        score.misses = 1;
        let judgements = vec![
            Judgement::Hit {
                index: 0,
                pitch: 60,
                offset_beats: -0.05,
            },
            Judgement::Hit {
                index: 1,
                pitch: 62,
                offset_beats: 0.07,
            },
            Judgement::Extra { pitch: 61 },
            Judgement::Missed {
                index: 2,
                pitch: Some(60),
            },
        ];
        let report = SessionAnalytics::report(&score, &judgements);
        assert_relative_eq!(report.accuracy, 0.5);
        assert_eq!((report.early_hits, report.late_hits), (1, 1));
        assert_relative_eq!(report.mean_offset_beats, 0.01, epsilon = 1e-12);
        assert_eq!(
            report.per_pitch[&60],
            PitchTally {
                hits: 1,
                wrong: 0,
                missed: 1
            }
        );
        assert_eq!(report.per_pitch[&61].wrong, 1);
    }

    #[test]
    fn verdicts_become_judgements() {
        let judgement = Judgement::from_verdict(
            64,
            &Verdict::Wrong {
                expected_index: 3,
                expected_pitch: Some(65),
            },
        );
        assert_eq!(
            judgement,
            Judgement::Wrong {
                pitch: 64,
                expected_index: 3
            }
        );
    }
}
