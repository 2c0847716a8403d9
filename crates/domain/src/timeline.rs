use serde::{Deserialize, Serialize};

use crate::{events::NoteEvent, tempo::Tempo};

/// A timeline entry near a queried playback time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub index: usize,
    /// Absolute distance in seconds between the note start and the query time.
    pub distance: f64,
}

/// Notes sorted by `start` once at construction and immutable afterwards.
///
/// The position of a note in [`Timeline::notes`] is its identity for the
/// rest of the session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "TimelineData")]
pub struct Timeline {
    tempo: Tempo,
    notes: Vec<NoteEvent>,
}

#[derive(Deserialize)]
struct TimelineData {
    tempo: Tempo,
    notes: Vec<NoteEvent>,
}

impl From<TimelineData> for Timeline {
    fn from(data: TimelineData) -> Self {
        Timeline::new(data.notes, data.tempo)
    }
}

impl Timeline {
    pub fn new(mut notes: Vec<NoteEvent>, tempo: Tempo) -> Self {
        // stable: notes sharing a start keep their source order
        notes.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { tempo, notes }
    }

    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn get(&self, index: usize) -> Option<&NoteEvent> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn seconds_per_beat(&self) -> f64 {
        self.tempo.seconds_per_beat()
    }

    pub fn start_beats(&self, index: usize) -> Option<f64> {
        self.get(index)
            .map(|note| note.start_beats(self.seconds_per_beat()))
    }

    /// Beat at which the last note finishes sounding.
    pub fn end_beats(&self) -> f64 {
        let spb = self.seconds_per_beat();
        self.notes
            .iter()
            .map(|note| note.start_beats(spb) + note.duration_beats)
            .fold(0.0, f64::max)
    }

    /// Every note whose start lies within `radius` seconds of `play_time`,
    /// nearest first. Equal distances keep timeline order.
    pub fn candidates_within(&self, play_time: f64, radius: f64) -> Vec<Candidate> {
        let first = self
            .notes
            .partition_point(|note| note.start < play_time - radius);
        let mut candidates: Vec<Candidate> = self.notes[first..]
            .iter()
            .enumerate()
            .take_while(|(_, note)| note.start <= play_time + radius)
            .map(|(offset, note)| Candidate {
                index: first + offset,
                distance: (note.start - play_time).abs(),
            })
            .filter(|candidate| candidate.distance <= radius)
            .collect();
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        candidates
    }
}
