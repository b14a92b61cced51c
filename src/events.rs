//! Domain events emitted by the aggregates.
//!
//! Aggregates buffer events internally and the engine drains them after a
//! successful save, handing them to the configured [`EventSink`]. Payloads
//! carry the flat set of identifiers a downstream consumer (XP awarding,
//! badge checks, analytics) needs without re-querying the content tree.
//!
//! [`EventSink`]: crate::store::EventSink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope around a single domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventPayload {
    CourseCreated {
        course_id: Uuid,
        author_id: Uuid,
        slug: String,
    },
    CoursePublished {
        course_id: Uuid,
        author_id: Uuid,
    },
    ExerciseCompleted {
        student_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
        exercise_id: Uuid,
    },
    LessonCompleted {
        student_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    },
}

impl EventPayload {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CourseCreated { .. } => "course_created",
            Self::CoursePublished { .. } => "course_published",
            Self::ExerciseCompleted { .. } => "exercise_completed",
            Self::LessonCompleted { .. } => "lesson_completed",
        }
    }
}

impl DomainEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn name(&self) -> &'static str {
        self.payload.name()
    }
}
