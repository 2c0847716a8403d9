pub mod builder;
pub mod error;
pub mod generate;
pub mod normalize;
pub mod source;

pub use builder::{BuildJob, TimelineBuilder, TimelineSource};
pub use error::BuildError;
pub use generate::{GeneratorConfig, HandRange, RandomGenerator};
pub use normalize::{resolve_pitch, RecordNormalizer};
pub use source::{load_records, parse_records, RecordFormat};
