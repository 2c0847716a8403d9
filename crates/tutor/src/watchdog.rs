use std::time::Instant;

use tracing::info;

use keyscroll_domain::Timeline;

use crate::config::TutorConfig;
use crate::context::AttemptLedger;

#[derive(Clone, Copy, Debug)]
pub struct MissWatchdog {
    threshold_beats: f64,
    count_unpitched: bool,
}

impl MissWatchdog {
    pub fn new(config: &TutorConfig) -> Self {
        Self {
            threshold_beats: config.miss_threshold_beats(),
            count_unpitched: config.count_unpitched_misses,
        }
    }

    pub fn threshold_beats(&self) -> f64 {
        self.threshold_beats
    }

    /// Mark every unattempted note whose window closed before `current_beat`.
    /// Returns the indices newly marked missed; empty while paused.
    pub fn scan(
        &self,
        timeline: Option<&Timeline>,
        current_beat: f64,
        paused: bool,
        ledger: &mut AttemptLedger,
        now: Instant,
    ) -> Vec<usize> {
        let Some(timeline) = timeline else {
            return Vec::new();
        };
        if paused {
            return Vec::new();
        }
        let spb = timeline.seconds_per_beat();
        let mut newly_missed = Vec::new();
        for (index, note) in timeline
            .notes()
            .iter()
            .enumerate()
            .take_while(|(_, note)| current_beat > note.start_beats(spb) + self.threshold_beats)
        {
            if note.is_rest() && !self.count_unpitched {
                continue;
            }
            if ledger.is_attempted(index)
                || ledger.is_missed(index)
                || ledger.recently_validated(index, now)
            {
                continue;
            }
            if ledger.mark_missed(index) {
                info!(index, note = %note.label(), start = note.start, "note missed");
                newly_missed.push(index);
            }
        }
        newly_missed
    }
}
