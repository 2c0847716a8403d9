use serde_json::{Map, Value};
use tracing::warn;

use keyscroll_domain::{
    pitch_from_name, Hand, NoteEvent, ScorePosition, Tempo, Timeline, CANONICAL_FIELDS,
};

const NUMERIC_PITCH_FIELDS: [&str; 2] = ["midi", "pitch"];
const PITCH_NAME_FIELDS: [&str; 2] = ["pitch", "note"];
const KEY_NAME_FIELDS: [&str; 3] = ["key", "name", "noteName"];
const KEY_LIST_FIELD: &str = "keys";

const DEFAULT_DURATION_BEATS: f64 = 1.0;

/// Resolve a chromatic pitch number from a raw record.
///
/// Probe order: numeric pitch, pitch-name string, alternate key-name fields,
/// then the first entry of a `keys` list. The first probe that resolves wins.
pub fn resolve_pitch(record: &Map<String, Value>) -> Option<u8> {
    NUMERIC_PITCH_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(numeric_pitch))
        .or_else(|| {
            PITCH_NAME_FIELDS
                .iter()
                .chain(KEY_NAME_FIELDS.iter())
                .find_map(|field| record.get(*field).and_then(named_pitch))
        })
        .or_else(|| {
            record
                .get(KEY_LIST_FIELD)
                .and_then(Value::as_array)
                .and_then(|keys| keys.first())
                .and_then(named_pitch)
        })
}

fn numeric_pitch(value: &Value) -> Option<u8> {
    let number = value.as_f64()?;
    if number.fract() != 0.0 || !(0.0..=127.0).contains(&number) {
        return None;
    }
    Some(number as u8)
}

fn named_pitch(value: &Value) -> Option<u8> {
    let text = value.as_str()?.trim();
    match text.parse::<u8>() {
        Ok(number) if number <= keyscroll_domain::pitch::MAX_PITCH => Some(number),
        Ok(_) => None,
        Err(_) => pitch_from_name(text),
    }
}

pub struct RecordNormalizer {
    tempo: Tempo,
}

impl RecordNormalizer {
    pub fn new(tempo: Tempo) -> Self {
        Self { tempo }
    }

    pub fn normalize(&self, records: &[Value]) -> Timeline {
        let notes: Vec<NoteEvent> = records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| {
                let note = self.normalize_record(record);
                if note.is_none() {
                    warn!(position, "dropping record without an object body or start time");
                }
                note
            })
            .collect();
        Timeline::new(notes, self.tempo)
    }

    /// `None` only when the record is not an object or carries no start time.
    /// An unresolved pitch yields a rest, never an error.
    pub fn normalize_record(&self, record: &Value) -> Option<NoteEvent> {
        let fields = record.as_object()?;
        let start = match fields.get("start").and_then(Value::as_f64) {
            Some(seconds) => seconds,
            None => self
                .tempo
                .beats_to_seconds(fields.get("startBeats").and_then(Value::as_f64)?),
        };
        if !start.is_finite() || start < 0.0 {
            return None;
        }

        let duration_beats = ["durationBeats", "duration"]
            .iter()
            .find_map(|field| fields.get(*field).and_then(Value::as_f64))
            .filter(|beats| beats.is_finite() && *beats > 0.0)
            .unwrap_or(DEFAULT_DURATION_BEATS);

        let pitch = resolve_pitch(fields);
        if pitch.is_none() {
            warn!(start, "record pitch unresolved, treating as rest");
        }

        let mut position = ScorePosition::from_beats(
            self.tempo.seconds_to_beats(start),
            self.tempo.beats_per_measure(),
        );
        if let Some(measure) = fields.get("measure").and_then(Value::as_u64) {
            position.measure = measure as u32;
        }
        if let Some(beat) = fields.get("beat").and_then(Value::as_u64) {
            position.beat = beat as u32;
        }
        if let Some(fraction) = fields.get("beatFraction").and_then(Value::as_f64) {
            position.beat_fraction = fraction;
        }

        let mut note = NoteEvent::new(start, pitch, duration_beats).with_position(position);
        if let Some(hand) = fields
            .get("hand")
            .and_then(|value| serde_json::from_value::<Hand>(value.clone()).ok())
        {
            note = note.with_hand(hand);
        }
        note.extra = fields
            .iter()
            .filter(|(key, _)| !CANONICAL_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> RecordNormalizer {
        RecordNormalizer::new(Tempo::constant(120.0).unwrap())
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn numeric_pitch_wins_over_names() {
        let record = object(json!({"midi": 64, "pitch": "C4", "keys": ["d/4"]}));
        assert_eq!(resolve_pitch(&record), Some(64));
        let numeric_pitch = object(json!({"pitch": 62, "note": "C4"}));
        assert_eq!(resolve_pitch(&numeric_pitch), Some(62));
    }

    #[test]
    fn falls_through_probe_order() {
        assert_eq!(resolve_pitch(&object(json!({"pitch": "E4"}))), Some(64));
        assert_eq!(resolve_pitch(&object(json!({"note": "zz", "key": "F4"}))), Some(65));
        assert_eq!(resolve_pitch(&object(json!({"noteName": "G#4"}))), Some(68));
        assert_eq!(resolve_pitch(&object(json!({"keys": ["a/4", "c/5"]}))), Some(69));
        assert_eq!(resolve_pitch(&object(json!({"pitch": "72"}))), Some(72));
    }

    #[test]
    fn unresolvable_pitch_is_a_rest() {
        let note = normalizer()
            .normalize_record(&json!({"start": 0.5, "keys": ["r/4"], "rest": true}))
            .unwrap();
        assert!(note.is_rest());
        assert_eq!(note.extra.get("rest"), Some(&Value::Bool(true)));
    }

    #[test]
    fn preserves_foreign_fields() {
        let note = normalizer()
            .normalize_record(&json!({
                "start": 1.0,
                "pitch": "D4",
                "duration": 2.0,
                "staff": 1,
                "tie": "start"
            }))
            .unwrap();
        assert_eq!(note.pitch_identifier, Some(62));
        assert_eq!(note.duration_beats, 2.0);
        assert_eq!(note.extra.get("pitch"), Some(&json!("D4")));
        assert_eq!(note.extra.get("staff"), Some(&json!(1)));
        assert_eq!(note.extra.get("tie"), Some(&json!("start")));
        // one second is two beats in at 120 bpm
        assert_eq!((note.measure, note.beat), (1, 3));
    }

    #[test]
    fn start_beats_and_defaults() {
        let note = normalizer()
            .normalize_record(&json!({"startBeats": 4.0, "midi": 60, "hand": "left"}))
            .unwrap();
        assert_eq!(note.start, 2.0);
        assert_eq!(note.duration_beats, DEFAULT_DURATION_BEATS);
        assert_eq!(note.hand, Some(Hand::Left));
        assert_eq!(note.measure, 2);
    }

    #[test]
    fn drops_records_without_start() {
        let timeline = normalizer().normalize(&[
            json!({"start": 1.0, "midi": 62}),
            json!({"midi": 61}),
            json!("not a record"),
            json!({"start": 0.0, "midi": 60}),
        ]);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.get(0).unwrap().pitch_identifier, Some(60));
    }
}
