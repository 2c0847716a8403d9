use std::future::pending;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use keyscroll_domain::Timeline;

use crate::clock::{ClockSnapshot, ClockState};
use crate::matching::MatchOutcome;
use crate::release::ReleaseVerdict;
use crate::session::{PracticeSession, SessionSummary};

#[derive(Debug, Clone)]
pub enum RunnerCommand {
    NoteOn { name: String, pitch: u8 },
    NoteOff { name: String, pitch: u8 },
    /// `None` flips the current state.
    TogglePause(Option<bool>),
    /// Keep the running score but drop per-note state.
    Resume,
    Restart,
    Load(Timeline),
    SetSpeedFactor(f64),
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum RunnerEvent {
    Matched(MatchOutcome),
    Released { pitch: u8, verdict: ReleaseVerdict },
    Missed(Vec<usize>),
    Clock(ClockState),
    Finished,
}

pub struct PracticeRunner {
    session: PracticeSession,
    commands: mpsc::Receiver<RunnerCommand>,
    events: Option<mpsc::UnboundedSender<RunnerEvent>>,
}

impl PracticeRunner {
    pub fn new(session: PracticeSession, commands: mpsc::Receiver<RunnerCommand>) -> Self {
        Self {
            session,
            commands,
            events: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<RunnerEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn clock(&self) -> watch::Receiver<ClockSnapshot> {
        self.session.subscribe_clock()
    }

    /// Run until `Shutdown` or until every command sender is dropped.
    pub async fn run(self) -> SessionSummary {
        let PracticeRunner {
            mut session,
            mut commands,
            events,
        } = self;
        let emit = |event: RunnerEvent| {
            if let Some(events) = &events {
                let _ = events.send(event);
            }
        };

        let mut ticker = time::interval(session.config().tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut watchdog = arm_watchdog(&session);
        let mut last_tick = Instant::now();
        let mut finished = false;

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    let now = Instant::now().into_std();
                    match command {
                        RunnerCommand::NoteOn { name, pitch } => {
                            debug!(%name, pitch, "note on");
                            if let Some(outcome) = session.note_on(pitch, now) {
                                emit(RunnerEvent::Matched(outcome));
                            }
                        }
                        RunnerCommand::NoteOff { name, pitch } => {
                            debug!(%name, pitch, "note off");
                            if let Some(verdict) = session.note_off(pitch) {
                                emit(RunnerEvent::Released { pitch, verdict });
                            }
                        }
                        RunnerCommand::TogglePause(paused) => {
                            let state = session.toggle_pause(paused);
                            last_tick = Instant::now();
                            watchdog = arm_watchdog(&session);
                            emit(RunnerEvent::Clock(state));
                        }
                        RunnerCommand::Resume => {
                            session.reset_state(false);
                            let state = session.toggle_pause(Some(false));
                            last_tick = Instant::now();
                            watchdog = arm_watchdog(&session);
                            emit(RunnerEvent::Clock(state));
                        }
                        RunnerCommand::Restart => {
                            session.restart();
                            watchdog = None;
                            finished = false;
                            emit(RunnerEvent::Clock(ClockState::Paused));
                        }
                        RunnerCommand::Load(timeline) => {
                            session.load_timeline(timeline);
                            watchdog = None;
                            finished = false;
                            emit(RunnerEvent::Clock(ClockState::Paused));
                        }
                        RunnerCommand::SetSpeedFactor(factor) => {
                            if let Err(err) = session.set_speed_factor(factor) {
                                warn!(%err, "ignoring speed change");
                            }
                        }
                        RunnerCommand::Shutdown => break,
                    }
                }
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f64();
                    last_tick = now;
                    session.tick(dt, now.into_std());
                    if !finished && session.is_finished() {
                        finished = true;
                        info!("playhead passed the last note");
                        emit(RunnerEvent::Finished);
                    }
                }
                _ = next_scan(&mut watchdog) => {
                    let missed = session.scan_misses(Instant::now().into_std());
                    if !missed.is_empty() {
                        emit(RunnerEvent::Missed(missed));
                    }
                }
            }
        }

        let summary = session.summary();
        info!(
            hits = summary.score.hits,
            wrong = summary.score.wrong_notes,
            misses = summary.score.misses,
            accuracy = summary.report.accuracy,
            "practice run finished"
        );
        summary
    }
}

/// A fresh watchdog interval while running, none while paused.
fn arm_watchdog(session: &PracticeSession) -> Option<Interval> {
    if session.is_paused() {
        return None;
    }
    let period = session.config().watchdog_interval();
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn next_scan(watchdog: &mut Option<Interval>) {
    match watchdog {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TutorConfig;
    use keyscroll_domain::{NoteEvent, Tempo};
    use std::time::Duration;

    fn timeline() -> Timeline {
        Timeline::new(
            vec![
                NoteEvent::new(0.0, Some(60), 1.0),
                NoteEvent::new(1.0, Some(62), 1.0),
                NoteEvent::new(3.0, Some(64), 1.0),
            ],
            Tempo::constant(60.0).unwrap(),
        )
    }

    fn runner(config: TutorConfig) -> (PracticeRunner, mpsc::Sender<RunnerCommand>) {
        let session = PracticeSession::with_timeline(config, timeline()).unwrap();
        let (tx, rx) = mpsc::channel(32);
        (PracticeRunner::new(session, rx), tx)
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_flags_untouched_notes() {
        let (runner, tx) = runner(TutorConfig {
            lead_in_beats: 0.0,
            ..Default::default()
        });
        let handle = tokio::spawn(runner.run());
        tx.send(RunnerCommand::TogglePause(Some(false))).await.unwrap();
        time::sleep(Duration::from_millis(9_700)).await;
        tx.send(RunnerCommand::Shutdown).await.unwrap();
        let summary = handle.await.unwrap();
        assert_eq!(summary.score.misses, 3);
        assert_eq!(summary.score.hits, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_does_not_recount_misses() {
        let (runner, tx) = runner(TutorConfig {
            lead_in_beats: 0.0,
            ..Default::default()
        });
        let handle = tokio::spawn(runner.run());
        tx.send(RunnerCommand::TogglePause(Some(false))).await.unwrap();
        time::sleep(Duration::from_millis(9_700)).await;
        tx.send(RunnerCommand::TogglePause(Some(true))).await.unwrap();
        tx.send(RunnerCommand::Resume).await.unwrap();
        time::sleep(Duration::from_millis(500)).await;
        tx.send(RunnerCommand::Shutdown).await.unwrap();
        let summary = handle.await.unwrap();
        assert_eq!(summary.score.misses, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_clears_score_and_replays() {
        let (runner, tx) = runner(TutorConfig {
            lead_in_beats: 0.0,
            ..Default::default()
        });
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(runner.with_events(events_tx).run());
        tx.send(RunnerCommand::TogglePause(Some(false))).await.unwrap();
        time::sleep(Duration::from_millis(9_700)).await;
        tx.send(RunnerCommand::Restart).await.unwrap();
        // parked after a restart: no scans
        time::sleep(Duration::from_secs(5)).await;
        tx.send(RunnerCommand::TogglePause(Some(false))).await.unwrap();
        time::sleep(Duration::from_millis(9_700)).await;
        tx.send(RunnerCommand::Shutdown).await.unwrap();
        let summary = handle.await.unwrap();
        assert_eq!(summary.score.misses, 3);

        let mut missed = 0;
        while let Ok(event) = events_rx.try_recv() {
            if let RunnerEvent::Missed(indices) = event {
                missed += indices.len();
            }
        }
        assert_eq!(missed, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_runner_never_scans() {
        let (runner, tx) = runner(TutorConfig {
            lead_in_beats: 0.0,
            ..Default::default()
        });
        let handle = tokio::spawn(runner.run());
        time::sleep(Duration::from_secs(20)).await;
        drop(tx);
        let summary = handle.await.unwrap();
        assert_eq!(summary.score.misses, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn emits_match_events() {
        let (runner, tx) = runner(TutorConfig {
            lead_in_beats: 1.0,
            ..Default::default()
        });
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(runner.with_events(events_tx).run());
        tx.send(RunnerCommand::TogglePause(Some(false))).await.unwrap();
        time::sleep(Duration::from_millis(2_000)).await;
        tx.send(RunnerCommand::NoteOn {
            name: "D4".into(),
            pitch: 62,
        })
        .await
        .unwrap();
        time::sleep(Duration::from_millis(10)).await;
        tx.send(RunnerCommand::Shutdown).await.unwrap();
        let summary = handle.await.unwrap();
        assert_eq!(summary.score.hits, 1);

        let mut saw_match = false;
        while let Ok(event) = events_rx.try_recv() {
            if let RunnerEvent::Matched(outcome) = event {
                assert!(outcome.verdict.is_correct());
                saw_match = true;
            }
        }
        assert!(saw_match);
    }
}
