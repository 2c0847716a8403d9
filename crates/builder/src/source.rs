use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::BuildError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Yaml,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => RecordFormat::Yaml,
            _ => RecordFormat::Json,
        }
    }
}

/// Parse raw note records from text. Accepts a top-level list or an object
/// holding the list under `notes`.
pub fn parse_records(text: &str, format: RecordFormat) -> Result<Vec<Value>, BuildError> {
    let document: Value = match format {
        RecordFormat::Json => {
            serde_json::from_str(text).map_err(|err| BuildError::Parse(err.to_string()))?
        }
        RecordFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|err| BuildError::Parse(err.to_string()))?
        }
    };
    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut fields) => match fields.remove("notes") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(BuildError::Parse("expected a `notes` list".into())),
        },
        _ => Err(BuildError::Parse("expected a list of note records".into())),
    }
}

pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Value>, BuildError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_records(&text, RecordFormat::from_path(path))?;
    debug!(count = records.len(), path = %path.display(), "loaded note records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_list_and_wrapped_object() {
        let list = parse_records(r#"[{"start": 0.0, "midi": 60}]"#, RecordFormat::Json).unwrap();
        assert_eq!(list.len(), 1);
        let wrapped = parse_records(
            r#"{"title": "x", "notes": [{"start": 0.0}, {"start": 1.0}]}"#,
            RecordFormat::Json,
        )
        .unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn parses_yaml() {
        let text = "notes:\n  - start: 0.5\n    pitch: C4\n  - start: 1.0\n    keys: [e/4]\n";
        let records = parse_records(text, RecordFormat::Yaml).unwrap();
        assert_eq!(records[0]["pitch"], "C4");
        assert_eq!(records[1]["keys"][0], "e/4");
    }

    #[test]
    fn rejects_scalars() {
        assert!(matches!(
            parse_records("42", RecordFormat::Json),
            Err(BuildError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_records("does-not-exist.json"),
            Err(BuildError::Io { .. })
        ));
        assert_eq!(
            RecordFormat::from_path(Path::new("lesson.yml")),
            RecordFormat::Yaml
        );
    }
}
