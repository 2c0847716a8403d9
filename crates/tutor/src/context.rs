use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::TutorConfig;
use crate::stamps::ExpiringStamps;

/// The timeline entry a held key was matched against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ActivePress {
    pub index: usize,
    pub start_beat: f64,
    pub duration_beats: f64,
}

/// Attempt bookkeeping keyed by timeline index.
#[derive(Debug, Clone)]
pub struct AttemptLedger {
    validated: ExpiringStamps<usize>,
    attempted: HashSet<usize>,
    missed: HashSet<usize>,
}

impl AttemptLedger {
    pub fn new(revalidation_window: Duration) -> Self {
        Self {
            validated: ExpiringStamps::new(revalidation_window),
            attempted: HashSet::new(),
            missed: HashSet::new(),
        }
    }

    pub fn mark_validated(&mut self, index: usize, now: Instant) {
        self.validated.stamp(index, now);
        self.attempted.insert(index);
    }

    pub fn mark_attempted(&mut self, index: usize) {
        self.attempted.insert(index);
    }

    /// Returns `true` only the first time an index is marked.
    pub fn mark_missed(&mut self, index: usize) -> bool {
        self.missed.insert(index)
    }

    pub fn recently_validated(&self, index: usize, now: Instant) -> bool {
        self.validated.is_live(&index, now)
    }

    pub fn is_attempted(&self, index: usize) -> bool {
        self.attempted.contains(&index)
    }

    pub fn is_missed(&self, index: usize) -> bool {
        self.missed.contains(&index)
    }

    pub fn missed_count(&self) -> usize {
        self.missed.len()
    }

    pub fn attempted_count(&self) -> usize {
        self.attempted.len()
    }

    pub fn purge(&mut self, now: Instant) {
        self.validated.purge(now);
    }

    /// Same attempted and missed sets, no live revalidation stamps.
    pub fn settled(&self, revalidation_window: Duration) -> Self {
        Self {
            validated: ExpiringStamps::new(revalidation_window),
            attempted: self.attempted.clone(),
            missed: self.missed.clone(),
        }
    }
}

/// Everything a practice run mutates besides the score. Replaced as a whole
/// on reset so no half-cleared state is ever visible.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub ledger: AttemptLedger,
    pub presses: HashMap<u8, ActivePress>,
    pub debounce: ExpiringStamps<u8>,
}

impl SessionContext {
    pub fn new(config: &TutorConfig) -> Self {
        Self {
            ledger: AttemptLedger::new(config.revalidation_window()),
            presses: HashMap::new(),
            debounce: ExpiringStamps::new(config.debounce()),
        }
    }

    /// Drop held keys, debounce and revalidation stamps but remember which
    /// notes are already settled, so a resumed run never judges them again.
    pub fn resumed(&self, config: &TutorConfig) -> Self {
        Self {
            ledger: self.ledger.settled(config.revalidation_window()),
            presses: HashMap::new(),
            debounce: ExpiringStamps::new(config.debounce()),
        }
    }
}
