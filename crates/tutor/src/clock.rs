use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    Paused,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClockSnapshot {
    pub position: f64,
    pub position_beats: f64,
    /// Wall seconds spent running; negative during the count-in.
    pub elapsed_active: f64,
    pub state: ClockState,
}

pub struct PlaybackClock {
    state: ClockState,
    position: f64,
    elapsed_active: f64,
    bpm: f64,
    pixels_per_beat: f64,
    speed_factor: f64,
    publisher: watch::Sender<ClockSnapshot>,
}

impl PlaybackClock {
    pub fn new(bpm: f64, pixels_per_beat: f64, speed_factor: f64) -> Self {
        let (publisher, _) = watch::channel(ClockSnapshot {
            position: 0.0,
            position_beats: 0.0,
            elapsed_active: 0.0,
            state: ClockState::Paused,
        });
        Self {
            state: ClockState::Paused,
            position: 0.0,
            elapsed_active: 0.0,
            bpm,
            pixels_per_beat,
            speed_factor,
            publisher,
        }
    }

    /// Reactive view of the clock for renderers.
    pub fn subscribe(&self) -> watch::Receiver<ClockSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            position: self.position,
            position_beats: self.position_beats(),
            elapsed_active: self.elapsed_active,
            state: self.state,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn position_beats(&self) -> f64 {
        self.position / self.pixels_per_beat
    }

    pub fn elapsed_active(&self) -> f64 {
        self.elapsed_active
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn pixels_per_beat(&self) -> f64 {
        self.pixels_per_beat
    }

    /// Position units advanced per wall-clock second while running.
    pub fn scroll_speed(&self) -> f64 {
        self.bpm / 60.0 * self.pixels_per_beat / self.speed_factor
    }

    /// Wall seconds needed to cover `beats` at the current speed.
    pub fn wall_seconds_for_beats(&self, beats: f64) -> f64 {
        beats * self.pixels_per_beat / self.scroll_speed()
    }

    /// Advance by `dt` wall seconds. Does nothing while paused.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.state == ClockState::Running && dt > 0.0 {
            self.position += dt * self.scroll_speed();
            self.elapsed_active += dt;
            self.publish();
        }
        self.position
    }

    /// Flip between paused and running, or force a state with `Some(paused)`.
    pub fn toggle_pause(&mut self, paused: Option<bool>) -> ClockState {
        let pause = paused.unwrap_or(self.state == ClockState::Running);
        self.state = if pause {
            ClockState::Paused
        } else {
            ClockState::Running
        };
        self.publish();
        self.state
    }

    /// Stop the clock and jump to `position` / `elapsed_active`.
    pub fn reset(&mut self, position: f64, elapsed_active: f64) {
        self.state = ClockState::Paused;
        self.position = position;
        self.elapsed_active = elapsed_active;
        self.publish();
    }

    /// Park the clock `beats` before zero so the first note gets a count-in.
    pub fn reset_to_lead_in(&mut self, beats: f64) {
        let seconds = self.wall_seconds_for_beats(beats);
        self.reset(-beats * self.pixels_per_beat, -seconds);
    }

    /// Changing the tempo keeps the current beat position.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.bpm = bpm;
        self.publish();
    }

    pub fn set_speed_factor(&mut self, speed_factor: f64) {
        self.speed_factor = speed_factor;
        self.publish();
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_paused_and_ignores_time() {
        let mut clock = PlaybackClock::new(60.0, 100.0, 1.0);
        assert!(clock.is_paused());
        clock.advance(1.0);
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn advances_at_scroll_speed() {
        let mut clock = PlaybackClock::new(120.0, 100.0, 1.0);
        clock.toggle_pause(None);
        clock.advance(0.5);
        assert_relative_eq!(clock.position(), 100.0);
        assert_relative_eq!(clock.position_beats(), 1.0);
        assert_relative_eq!(clock.elapsed_active(), 0.5);
    }

    #[test]
    fn speed_factor_slows_playback() {
        let mut clock = PlaybackClock::new(120.0, 50.0, 2.0);
        clock.toggle_pause(Some(false));
        clock.advance(1.0);
        assert_relative_eq!(clock.position_beats(), 1.0);
    }

    #[test]
    fn reset_forces_pause_and_supports_lead_in() {
        let mut clock = PlaybackClock::new(60.0, 100.0, 1.0);
        clock.toggle_pause(Some(false));
        clock.advance(2.0);
        clock.reset_to_lead_in(4.0);
        assert!(clock.is_paused());
        assert_relative_eq!(clock.position_beats(), -4.0);
        assert_relative_eq!(clock.elapsed_active(), -4.0);

        clock.toggle_pause(None);
        clock.advance(4.5);
        assert_relative_eq!(clock.position_beats(), 0.5);
    }

    #[test]
    fn reactive_view_matches_direct_reads() {
        let mut clock = PlaybackClock::new(90.0, 80.0, 1.5);
        let view = clock.subscribe();
        clock.toggle_pause(None);
        for _ in 0..10 {
            clock.advance(0.016);
            let seen = *view.borrow();
            assert_eq!(seen.position, clock.position());
            assert_eq!(seen.position_beats, clock.position_beats());
            assert_eq!(seen.state, ClockState::Running);
        }
        clock.reset(-10.0, -0.1);
        assert_eq!(view.borrow().position, -10.0);
        assert_eq!(view.borrow().state, ClockState::Paused);
    }
}
