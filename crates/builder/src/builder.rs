use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use keyscroll_domain::{Lesson, Tempo};

use crate::error::BuildError;
use crate::generate::{GeneratorConfig, RandomGenerator};
use crate::normalize::RecordNormalizer;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineSource {
    Generated(GeneratorConfig),
    Records { tempo_bpm: f64, records: Vec<Value> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildJob {
    pub id: String,
    pub title: String,
    pub source: TimelineSource,
}

/// Produces a lesson from either construction path.
#[derive(Default)]
pub struct TimelineBuilder;

impl TimelineBuilder {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, job), fields(id = %job.id))]
    pub fn build(&self, job: &BuildJob) -> Result<Lesson, BuildError> {
        let (timeline, description) = match &job.source {
            TimelineSource::Generated(config) => {
                let generator = RandomGenerator::new(config.clone())?;
                (generator.generate(), "Generated exercise")
            }
            TimelineSource::Records { tempo_bpm, records } => {
                let normalizer = RecordNormalizer::new(Tempo::constant(*tempo_bpm)?);
                (normalizer.normalize(records), "Imported lesson")
            }
        };
        info!(notes = timeline.len(), bpm = timeline.tempo().bpm, "timeline built");
        Ok(Lesson::new(
            job.id.clone(),
            job.title.clone(),
            description,
            timeline,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_generated_lesson() {
        let job = BuildJob {
            id: "gen".into(),
            title: "Warmup".into(),
            source: TimelineSource::Generated(GeneratorConfig {
                count: 8,
                seed: Some(3),
                ..Default::default()
            }),
        };
        let lesson = TimelineBuilder::new().build(&job).unwrap();
        assert_eq!(lesson.note_count(), 8);
        assert_eq!(lesson.description, "Generated exercise");
    }

    #[test]
    fn builds_imported_lesson() {
        let job = BuildJob {
            id: "imp".into(),
            title: "Minuet".into(),
            source: TimelineSource::Records {
                tempo_bpm: 60.0,
                records: vec![
                    json!({"start": 1.0, "pitch": "G4"}),
                    json!({"start": 0.0, "midi": 67}),
                ],
            },
        };
        let lesson = TimelineBuilder::new().build(&job).unwrap();
        assert_eq!(lesson.timeline.get(0).unwrap().start, 0.0);
        assert_eq!(lesson.timeline.get(1).unwrap().pitch_identifier, Some(67));
    }

    #[test]
    fn invalid_tempo_fails() {
        let job = BuildJob {
            id: "bad".into(),
            title: "Bad".into(),
            source: TimelineSource::Records {
                tempo_bpm: 1.0,
                records: Vec::new(),
            },
        };
        assert!(matches!(
            TimelineBuilder::new().build(&job),
            Err(BuildError::Domain(_))
        ));
    }

    #[test]
    fn source_deserializes_from_tagged_json() {
        let source: TimelineSource =
            serde_json::from_value(json!({"kind": "generated", "count": 4, "seed": 9})).unwrap();
        match source {
            TimelineSource::Generated(config) => assert_eq!(config.count, 4),
            other => panic!("unexpected source {:?}", other),
        }
    }
}
