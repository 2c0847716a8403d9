pub mod analytics;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod feedback;
pub mod matching;
pub mod midi;
pub mod release;
pub mod runner;
pub mod scoring;
pub mod session;
pub mod stamps;
pub mod watchdog;

pub use analytics::{Judgement, PerformanceReport, SessionAnalytics};
pub use clock::{ClockSnapshot, ClockState, PlaybackClock};
pub use config::TutorConfig;
pub use context::{ActivePress, AttemptLedger, SessionContext};
pub use error::TutorError;
pub use matching::{FeedbackColor, MatchOutcome, MatchingEngine, Verdict};
pub use midi::{DeviceStatus, InputEvent, MidiDevice, MidiManager};
pub use release::{ReleaseKind, ReleaseValidator, ReleaseVerdict};
pub use runner::{PracticeRunner, RunnerCommand, RunnerEvent};
pub use scoring::{ReleaseTally, ScoreBoard};
pub use session::{PracticeSession, SessionSummary};
pub use watchdog::MissWatchdog;
