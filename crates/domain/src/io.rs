use serde::{Deserialize, Serialize};

use crate::{error::DomainError, lesson::Lesson};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Yaml,
}

pub trait LessonExporter {
    fn export(&self, lesson: &Lesson, format: ExportFormat) -> Result<Vec<u8>, DomainError>;
}

pub struct JsonExporter;

impl LessonExporter for JsonExporter {
    fn export(&self, lesson: &Lesson, format: ExportFormat) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Json => serde_json::to_vec_pretty(lesson)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            other => Err(DomainError::validation(format!(
                "JsonExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

pub struct YamlExporter;

impl LessonExporter for YamlExporter {
    fn export(&self, lesson: &Lesson, format: ExportFormat) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Yaml => serde_yaml::to_string(lesson)
                .map(String::into_bytes)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            other => Err(DomainError::validation(format!(
                "YamlExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

/// Pick the exporter matching `format`.
pub fn exporter_for(format: ExportFormat) -> Box<dyn LessonExporter> {
    match format {
        ExportFormat::Json => Box::new(JsonExporter),
        ExportFormat::Yaml => Box::new(YamlExporter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::NoteEvent, tempo::Tempo, timeline::Timeline};

    fn lesson() -> Lesson {
        let tempo = Tempo::constant(120.0).unwrap();
        Lesson::new(
            "id",
            "title",
            "desc",
            Timeline::new(vec![NoteEvent::new(0.0, Some(60), 1.0)], tempo),
        )
    }

    #[test]
    fn exports_json() {
        let bytes = JsonExporter.export(&lesson(), ExportFormat::Json).unwrap();
        let output = String::from_utf8(bytes).unwrap();
        assert!(output.contains("\"title\": \"title\""));
        assert!(output.contains("\"pitchIdentifier\": 60"));
    }

    #[test]
    fn exports_yaml() {
        let bytes = exporter_for(ExportFormat::Yaml)
            .export(&lesson(), ExportFormat::Yaml)
            .unwrap();
        let output = String::from_utf8(bytes).unwrap();
        assert!(output.contains("title: title"));
    }

    #[test]
    fn json_exporter_rejects_yaml() {
        assert!(JsonExporter.export(&lesson(), ExportFormat::Yaml).is_err());
    }
}
