use std::time::Instant;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use keyscroll_domain::Timeline;

use crate::analytics::{Judgement, PerformanceReport, SessionAnalytics};
use crate::clock::{ClockSnapshot, ClockState, PlaybackClock};
use crate::config::TutorConfig;
use crate::context::SessionContext;
use crate::error::TutorError;
use crate::feedback::FeedbackPulse;
use crate::matching::{FeedbackColor, MatchOutcome, MatchingEngine};
use crate::release::{ReleaseValidator, ReleaseVerdict};
use crate::scoring::ScoreBoard;
use crate::watchdog::MissWatchdog;

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub notes: usize,
    pub score: ScoreBoard,
    pub report: PerformanceReport,
}

pub struct PracticeSession {
    config: TutorConfig,
    timeline: Option<Timeline>,
    clock: PlaybackClock,
    context: SessionContext,
    score: ScoreBoard,
    judgements: Vec<Judgement>,
    pulse: FeedbackPulse,
    matcher: MatchingEngine,
    releases: ReleaseValidator,
    watchdog: MissWatchdog,
}

impl PracticeSession {
    pub fn new(config: TutorConfig) -> Result<Self, TutorError> {
        config.validate()?;
        Ok(Self {
            clock: PlaybackClock::new(
                config.tempo_bpm,
                config.pixels_per_beat,
                config.speed_factor,
            ),
            context: SessionContext::new(&config),
            score: ScoreBoard::new(),
            judgements: Vec::new(),
            pulse: FeedbackPulse::new(config.pulse()),
            matcher: MatchingEngine::new(&config),
            releases: ReleaseValidator::new(config.enforce_duration),
            watchdog: MissWatchdog::new(&config),
            timeline: None,
            config,
        })
    }

    pub fn with_timeline(config: TutorConfig, timeline: Timeline) -> Result<Self, TutorError> {
        let mut session = Self::new(config)?;
        session.load_timeline(timeline);
        Ok(session)
    }

    /// Swap in a new timeline: full reset, clock parked at the count-in.
    pub fn load_timeline(&mut self, timeline: Timeline) {
        info!(
            notes = timeline.len(),
            bpm = timeline.tempo().bpm,
            "loading timeline"
        );
        self.clock.set_tempo(timeline.tempo().bpm);
        self.timeline = Some(timeline);
        self.restart();
    }

    pub fn clear_timeline(&mut self) {
        self.timeline = None;
        self.clock.set_tempo(self.config.tempo_bpm);
        self.restart();
    }

    /// Reset state and score and rewind to the count-in.
    pub fn restart(&mut self) {
        self.reset_state(true);
        self.clock.reset_to_lead_in(self.config.lead_in_beats);
    }

    /// With `reset_score` everything goes: ledger, presses, counters and the
    /// judgement log. Without it only transient per-note state is cleared and
    /// notes already hit, attempted or missed stay settled.
    pub fn reset_state(&mut self, reset_score: bool) {
        self.context = if reset_score {
            SessionContext::new(&self.config)
        } else {
            self.context.resumed(&self.config)
        };
        self.pulse.clear();
        if reset_score {
            self.score = ScoreBoard::new();
            self.judgements.clear();
        }
        debug!(reset_score, "session state reset");
    }

    pub fn note_on(&mut self, pitch: u8, now: Instant) -> Option<MatchOutcome> {
        self.context.debounce.purge(now);
        if self.context.debounce.is_live(&pitch, now) {
            debug!(pitch, "debounced repeated note-on");
            return None;
        }
        self.context.debounce.stamp(pitch, now);

        let position_beats = self.clock.position_beats();
        let outcome = self.matcher.match_note_on(
            pitch,
            position_beats,
            self.timeline.as_ref(),
            &mut self.context,
            now,
        );
        if self.timeline.as_ref().map_or(true, Timeline::is_empty) {
            // nothing to play against: report, but leave the score alone
            return Some(outcome);
        }
        self.score.record_verdict(&outcome.verdict);
        self.judgements
            .push(Judgement::from_verdict(pitch, &outcome.verdict));
        self.pulse.flash(outcome.color, now);
        debug!(pitch, position_beats, verdict = ?outcome.verdict, "{}", outcome.message);
        Some(outcome)
    }

    /// The pitch always leaves the press map, verdict or not.
    pub fn note_off(&mut self, pitch: u8) -> Option<ReleaseVerdict> {
        let press = self.context.presses.remove(&pitch);
        let verdict = self
            .releases
            .validate(self.clock.position_beats(), press.as_ref())?;
        self.score.record_release(verdict.kind);
        debug!(pitch, kind = ?verdict.kind, held = verdict.held_beats, "release judged");
        Some(verdict)
    }

    /// Advance the clock by `dt` wall seconds and expire the feedback pulse.
    pub fn tick(&mut self, dt: f64, now: Instant) -> f64 {
        self.pulse.tick(now);
        self.clock.advance(dt)
    }

    pub fn scan_misses(&mut self, now: Instant) -> Vec<usize> {
        let missed = self.watchdog.scan(
            self.timeline.as_ref(),
            self.clock.position_beats(),
            self.clock.is_paused(),
            &mut self.context.ledger,
            now,
        );
        if !missed.is_empty() {
            self.score.record_misses(missed.len());
            let timeline = self.timeline.as_ref();
            self.judgements.extend(missed.iter().map(|&index| Judgement::Missed {
                index,
                pitch: timeline
                    .and_then(|timeline| timeline.get(index))
                    .and_then(|note| note.pitch_identifier),
            }));
        }
        missed
    }

    pub fn toggle_pause(&mut self, paused: Option<bool>) -> ClockState {
        let state = self.clock.toggle_pause(paused);
        info!(?state, position_beats = self.clock.position_beats(), "clock state changed");
        state
    }

    pub fn set_speed_factor(&mut self, speed_factor: f64) -> Result<(), TutorError> {
        if !speed_factor.is_finite() || speed_factor <= 0.0 {
            return Err(TutorError::config("speed_factor must be positive"));
        }
        self.config.speed_factor = speed_factor;
        self.clock.set_speed_factor(speed_factor);
        Ok(())
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn subscribe_clock(&self) -> watch::Receiver<ClockSnapshot> {
        self.clock.subscribe()
    }

    pub fn position_beats(&self) -> f64 {
        self.clock.position_beats()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn judgements(&self) -> &[Judgement] {
        &self.judgements
    }

    pub fn flash_color(&self) -> Option<FeedbackColor> {
        self.pulse.color()
    }

    pub fn pulse_active(&self) -> bool {
        self.pulse.is_active()
    }

    /// True once the playhead has passed every note's miss window.
    pub fn is_finished(&self) -> bool {
        self.timeline.as_ref().is_some_and(|timeline| {
            self.clock.position_beats() > timeline.end_beats() + self.watchdog.threshold_beats()
        })
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            notes: self.timeline.as_ref().map_or(0, Timeline::len),
            score: self.score,
            report: SessionAnalytics::report(&self.score, &self.judgements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyscroll_domain::{NoteEvent, Tempo};
    use std::time::Duration;

    fn session() -> PracticeSession {
        let timeline = Timeline::new(
            vec![
                NoteEvent::new(0.0, Some(60), 1.0),
                NoteEvent::new(1.0, Some(62), 1.0),
            ],
            Tempo::constant(60.0).unwrap(),
        );
        let config = TutorConfig {
            pixels_per_beat: 10.0,
            ..Default::default()
        };
        PracticeSession::with_timeline(config, timeline).unwrap()
    }

    #[test]
    fn loading_parks_clock_at_count_in() {
        let session = session();
        assert!(session.is_paused());
        assert_eq!(session.position_beats(), -4.0);
    }

    #[test]
    fn debounce_swallows_bounces() {
        let mut session = session();
        session.toggle_pause(Some(false));
        session.tick(4.0, Instant::now());
        let now = Instant::now();
        assert!(session.note_on(60, now).is_some());
        assert!(session.note_on(60, now + Duration::from_millis(20)).is_none());
        assert_eq!(session.score().hits, 1);
        assert_eq!(session.score().wrong_notes, 0);
    }

    #[test]
    fn note_off_always_clears_press() {
        let mut session = session();
        session.toggle_pause(Some(false));
        let now = Instant::now();
        session.tick(4.0, now);
        session.note_on(60, now);
        assert!(session.context().presses.contains_key(&60));
        session.tick(1.0, now);
        let verdict = session.note_off(60).unwrap();
        assert_eq!(verdict.kind, crate::release::ReleaseKind::PerfectRelease);
        assert!(session.context().presses.is_empty());
        assert_eq!(session.score().releases.perfect, 1);
        assert!(session.note_off(60).is_none());
    }

    #[test]
    fn pulse_follows_verdicts() {
        let mut session = session();
        let now = Instant::now();
        session.note_on(70, now);
        assert_eq!(session.flash_color(), Some(FeedbackColor::Red));
        session.tick(0.0, now + Duration::from_millis(250));
        assert!(!session.pulse_active());
    }

    #[test]
    fn note_on_without_timeline_leaves_score_alone() {
        let mut session = PracticeSession::new(TutorConfig::default()).unwrap();
        let outcome = session.note_on(60, Instant::now()).unwrap();
        assert_eq!(outcome.verdict, crate::matching::Verdict::Extra);
        assert_eq!(outcome.color, FeedbackColor::Red);
        assert_eq!(session.score().wrong_notes, 0);
        assert!(session.judgements().is_empty());

        session.load_timeline(Timeline::new(Vec::new(), Tempo::constant(60.0).unwrap()));
        session.note_on(62, Instant::now()).unwrap();
        assert_eq!(session.score().wrong_notes, 0);
    }

    #[test]
    fn resume_reset_does_not_recount_misses() {
        let mut session = session();
        session.toggle_pause(Some(false));
        let now = Instant::now();
        session.tick(4.0, now);
        session.note_on(60, now);
        session.tick(9.5, now);
        assert_eq!(session.scan_misses(now), vec![1]);

        session.reset_state(false);
        let later = now + Duration::from_millis(200);
        assert!(session.scan_misses(later).is_empty());
        assert_eq!(session.score().hits, 1);
        assert_eq!(session.score().misses, 1);
    }

    #[test]
    fn speed_factor_must_be_positive() {
        let mut session = session();
        assert!(session.set_speed_factor(0.0).is_err());
        assert!(session.set_speed_factor(2.0).is_ok());
        assert_eq!(session.clock().speed_factor(), 2.0);
    }
}
