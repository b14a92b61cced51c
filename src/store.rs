//! Collaborator contracts at the persistence and event boundary.
//!
//! The core never prescribes a schema or wire format; an embedding service
//! supplies implementations of these traits. Concurrent load → mutate →
//! save cycles for the same aggregate key must be serialized by the store
//! (per-key transaction or a version check against
//! [`StudentProgress::version`]); the core itself does not lock.
//!
//! [`StudentProgress::version`]: crate::progress::StudentProgress

use async_trait::async_trait;
use uuid::Uuid;

use crate::course::Course;
use crate::error::LearnResult;
use crate::events::DomainEvent;
use crate::progress::StudentProgress;

#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Full content tree, or None when the id is unknown.
    async fn load(&self, course_id: Uuid) -> LearnResult<Option<Course>>;

    /// Slug lookup for uniqueness checks.
    async fn find_by_slug(&self, slug: &str) -> LearnResult<Option<Course>>;

    async fn save(&self, course: &Course) -> LearnResult<()>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// None means not-yet-started, not an error.
    async fn load(&self, student_id: Uuid, course_id: Uuid) -> LearnResult<Option<StudentProgress>>;

    async fn save(&self, progress: &StudentProgress) -> LearnResult<()>;
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> LearnResult<()>;
}
