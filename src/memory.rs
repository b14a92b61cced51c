//! In-memory store implementations.
//!
//! Used by the test suite and by single-process embeddings. These stores do
//! last-writer-wins on save; they do not serialize concurrent load → mutate
//! → save cycles and are not meant for contended production use.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::course::Course;
use crate::error::LearnResult;
use crate::events::DomainEvent;
use crate::progress::StudentProgress;
use crate::store::{CourseStore, EventSink, ProgressStore};

#[derive(Default)]
pub struct MemoryCourseStore {
    courses: RwLock<HashMap<Uuid, Course>>,
}

impl MemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn load(&self, course_id: Uuid) -> LearnResult<Option<Course>> {
        Ok(self.courses.read().await.get(&course_id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> LearnResult<Option<Course>> {
        Ok(self
            .courses
            .read()
            .await
            .values()
            .find(|course| course.slug == slug)
            .cloned())
    }

    async fn save(&self, course: &Course) -> LearnResult<()> {
        self.courses.write().await.insert(course.id, course.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryProgressStore {
    records: RwLock<HashMap<(Uuid, Uuid), StudentProgress>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self, student_id: Uuid, course_id: Uuid) -> LearnResult<Option<StudentProgress>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(student_id, course_id))
            .cloned())
    }

    async fn save(&self, progress: &StudentProgress) -> LearnResult<()> {
        self.records
            .write()
            .await
            .insert((progress.student_id, progress.course_id), progress.clone());
        Ok(())
    }
}

/// Collects published events for inspection.
#[derive(Default)]
pub struct MemoryEventSink {
    events: RwLock<Vec<DomainEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<DomainEvent> {
        self.events.read().await.clone()
    }

    pub async fn names(&self) -> Vec<&'static str> {
        self.events.read().await.iter().map(|e| e.name()).collect()
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn publish(&self, event: DomainEvent) -> LearnResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::course::CreateCourseRequest;

    use super::*;

    #[tokio::test]
    async fn course_round_trip_and_slug_lookup() {
        let store = MemoryCourseStore::new();
        let mut course = Course::create(
            CreateCourseRequest {
                title: "Testing in Rust".to_string(),
                description: None,
                slug: None,
                metadata: None,
            },
            Uuid::new_v4(),
        )
        .unwrap();
        course.take_events();
        store.save(&course).await.unwrap();

        let loaded = store.load(course.id).await.unwrap().unwrap();
        assert_eq!(loaded.slug, "testing-in-rust");
        assert!(store
            .find_by_slug("testing-in-rust")
            .await
            .unwrap()
            .is_some());
        assert!(store.find_by_slug("missing").await.unwrap().is_none());
        assert!(store.load(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_progress_reads_as_none() {
        let store = MemoryProgressStore::new();
        let (student, course) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(store.load(student, course).await.unwrap().is_none());

        store
            .save(&StudentProgress::new(student, course))
            .await
            .unwrap();
        assert!(store.load(student, course).await.unwrap().is_some());
    }
}
