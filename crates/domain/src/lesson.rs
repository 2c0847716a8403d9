use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub timeline: Timeline,
}

impl Lesson {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        timeline: Timeline,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            timeline,
        }
    }

    pub fn note_count(&self) -> usize {
        self.timeline.len()
    }
}
