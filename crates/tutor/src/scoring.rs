use serde::{Deserialize, Serialize};

use crate::matching::Verdict;
use crate::release::ReleaseKind;

/// Advisory release quality. Kept apart from the accuracy counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseTally {
    pub perfect: u32,
    pub early: u32,
    pub late: u32,
}

impl ReleaseTally {
    pub fn record(&mut self, kind: ReleaseKind) {
        match kind {
            ReleaseKind::PerfectRelease => self.perfect += 1,
            ReleaseKind::EarlyRelease => self.early += 1,
            ReleaseKind::LateRelease => self.late += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.early + self.late
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBoard {
    pub hits: u32,
    pub wrong_notes: u32,
    pub misses: u32,
    pub releases: ReleaseTally,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_verdict(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Correct { .. } => self.hits += 1,
            Verdict::Wrong { .. } | Verdict::Extra => self.wrong_notes += 1,
        }
    }

    pub fn record_misses(&mut self, count: usize) {
        self.misses += count as u32;
    }

    pub fn record_release(&mut self, kind: ReleaseKind) {
        self.releases.record(kind);
    }

    pub fn judged(&self) -> u32 {
        self.hits + self.wrong_notes + self.misses
    }

    /// Share of judged events that were hits; zero before anything is judged.
    pub fn accuracy(&self) -> f64 {
        match self.judged() {
            0 => 0.0,
            total => f64::from(self.hits) / f64::from(total),
        }
    }
}
