use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use keyscroll_domain::{pitch_name, Candidate, Timeline};

use crate::config::TutorConfig;
use crate::context::{ActivePress, SessionContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackColor {
    Green,
    Red,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correct {
        index: usize,
        /// Signed distance from the note start; negative means early.
        offset_beats: f64,
    },
    Wrong {
        expected_index: usize,
        expected_pitch: Option<u8>,
    },
    Extra,
}

impl Verdict {
    pub fn color(&self) -> FeedbackColor {
        match self {
            Verdict::Correct { .. } => FeedbackColor::Green,
            Verdict::Wrong { .. } | Verdict::Extra => FeedbackColor::Red,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub pitch: u8,
    pub position_beats: f64,
    pub verdict: Verdict,
    pub message: String,
    pub color: FeedbackColor,
}

impl MatchOutcome {
    fn new(pitch: u8, position_beats: f64, verdict: Verdict, message: String) -> Self {
        Self {
            pitch,
            position_beats,
            color: verdict.color(),
            verdict,
            message,
        }
    }

    fn extra(pitch: u8, position_beats: f64) -> Self {
        Self::new(
            pitch,
            position_beats,
            Verdict::Extra,
            format!("Extra note {}", pitch_name(pitch)),
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MatchingEngine {
    strict_tolerance_beats: f64,
    wide_tolerance_beats: f64,
}

impl MatchingEngine {
    pub fn new(config: &TutorConfig) -> Self {
        Self {
            strict_tolerance_beats: config.strict_tolerance_beats,
            wide_tolerance_beats: config.wide_tolerance_beats,
        }
    }

    /// Judge a pitch-on at `position_beats`. Never fails: a missing or empty
    /// timeline is judged `Extra` and leaves the context untouched.
    pub fn match_note_on(
        &self,
        pitch: u8,
        position_beats: f64,
        timeline: Option<&Timeline>,
        context: &mut SessionContext,
        now: Instant,
    ) -> MatchOutcome {
        let Some(timeline) = timeline.filter(|timeline| !timeline.is_empty()) else {
            return MatchOutcome::extra(pitch, position_beats);
        };
        let spb = timeline.seconds_per_beat();
        let play_time = position_beats * spb;

        context.ledger.purge(now);
        let candidates: Vec<Candidate> = timeline
            .candidates_within(play_time, self.wide_tolerance_beats * spb)
            .into_iter()
            .filter(|candidate| !context.ledger.recently_validated(candidate.index, now))
            .collect();
        let Some(nearest) = candidates.first().copied() else {
            debug!(pitch, position_beats, "no expected note nearby");
            return MatchOutcome::extra(pitch, position_beats);
        };

        let strict = self.strict_tolerance_beats * spb;
        let hit = candidates.iter().find(|candidate| {
            candidate.distance <= strict
                && timeline
                    .get(candidate.index)
                    .and_then(|note| note.pitch_identifier)
                    == Some(pitch)
        });

        if let Some(hit) = hit {
            let note = &timeline.notes()[hit.index];
            context.presses.insert(
                pitch,
                ActivePress {
                    index: hit.index,
                    start_beat: position_beats,
                    duration_beats: note.duration_beats,
                },
            );
            context.ledger.mark_validated(hit.index, now);
            let offset_beats = position_beats - note.start_beats(spb);
            return MatchOutcome::new(
                pitch,
                position_beats,
                Verdict::Correct {
                    index: hit.index,
                    offset_beats,
                },
                format!("Correct {}", pitch_name(pitch)),
            );
        }

        context.ledger.mark_attempted(nearest.index);
        let expected = timeline
            .get(nearest.index)
            .and_then(|note| note.pitch_identifier);
        let expected_label = expected.map(pitch_name).unwrap_or_else(|| "a rest".into());
        MatchOutcome::new(
            pitch,
            position_beats,
            Verdict::Wrong {
                expected_index: nearest.index,
                expected_pitch: expected,
            },
            format!("Wrong note {}, expected {}", pitch_name(pitch), expected_label),
        )
    }
}
