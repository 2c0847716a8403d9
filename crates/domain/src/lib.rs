pub mod error;
pub mod events;
pub mod io;
pub mod lesson;
pub mod pitch;
pub mod tempo;
pub mod timeline;

pub use crate::error::DomainError;
pub use crate::events::{Hand, NoteEvent, ScorePosition, CANONICAL_FIELDS};
pub use crate::io::{exporter_for, ExportFormat, LessonExporter};
pub use crate::lesson::Lesson;
pub use crate::pitch::{is_sharp, pitch_from_name, pitch_name};
pub use crate::tempo::Tempo;
pub use crate::timeline::{Candidate, Timeline};
