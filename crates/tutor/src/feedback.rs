use std::time::{Duration, Instant};

use crate::matching::FeedbackColor;

/// Short-lived flash shown after every verdict.
#[derive(Debug, Clone)]
pub struct FeedbackPulse {
    decay: Duration,
    flash: Option<(FeedbackColor, Instant)>,
}

impl FeedbackPulse {
    pub fn new(decay: Duration) -> Self {
        Self { decay, flash: None }
    }

    pub fn flash(&mut self, color: FeedbackColor, now: Instant) {
        self.flash = Some((color, now));
    }

    /// Clear the flash once it has decayed.
    pub fn tick(&mut self, now: Instant) {
        if let Some((_, since)) = self.flash {
            if now.saturating_duration_since(since) >= self.decay {
                self.flash = None;
            }
        }
    }

    pub fn color(&self) -> Option<FeedbackColor> {
        self.flash.map(|(color, _)| color)
    }

    pub fn is_active(&self) -> bool {
        self.flash.is_some()
    }

    pub fn clear(&mut self) {
        self.flash = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_decays() {
        let start = Instant::now();
        let mut pulse = FeedbackPulse::new(Duration::from_millis(220));
        pulse.flash(FeedbackColor::Green, start);
        pulse.tick(start + Duration::from_millis(100));
        assert_eq!(pulse.color(), Some(FeedbackColor::Green));
        pulse.tick(start + Duration::from_millis(220));
        assert!(!pulse.is_active());
    }

    #[test]
    fn new_flash_restarts_decay() {
        let start = Instant::now();
        let mut pulse = FeedbackPulse::new(Duration::from_millis(220));
        pulse.flash(FeedbackColor::Green, start);
        pulse.flash(FeedbackColor::Red, start + Duration::from_millis(200));
        pulse.tick(start + Duration::from_millis(300));
        assert_eq!(pulse.color(), Some(FeedbackColor::Red));
    }
}
