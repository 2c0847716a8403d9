use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Timestamps that stop counting once `ttl` has elapsed.
///
/// Expired entries are skipped on lookup and only dropped by `purge`.
#[derive(Debug, Clone)]
pub struct ExpiringStamps<K> {
    ttl: Duration,
    stamps: HashMap<K, Instant>,
}

impl<K: Copy + Eq + Hash> ExpiringStamps<K> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            stamps: HashMap::new(),
        }
    }

    pub fn stamp(&mut self, key: K, now: Instant) {
        self.stamps.insert(key, now);
    }

    pub fn is_live(&self, key: &K, now: Instant) -> bool {
        self.stamps
            .get(key)
            .is_some_and(|at| now.saturating_duration_since(*at) < self.ttl)
    }

    pub fn purge(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.stamps
            .retain(|_, at| now.saturating_duration_since(*at) < ttl);
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_ttl() {
        let start = Instant::now();
        let mut stamps = ExpiringStamps::new(Duration::from_millis(500));
        stamps.stamp(3usize, start);
        assert!(stamps.is_live(&3, start + Duration::from_millis(499)));
        assert!(!stamps.is_live(&3, start + Duration::from_millis(500)));
        assert!(!stamps.is_live(&4, start));
    }

    #[test]
    fn purge_drops_only_expired() {
        let start = Instant::now();
        let mut stamps = ExpiringStamps::new(Duration::from_millis(50));
        stamps.stamp(60u8, start);
        stamps.stamp(62u8, start + Duration::from_millis(40));
        stamps.purge(start + Duration::from_millis(60));
        assert_eq!(stamps.len(), 1);
        assert!(stamps.is_live(&62, start + Duration::from_millis(60)));
    }
}
