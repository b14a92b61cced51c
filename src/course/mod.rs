//! Course content tree: the authoring-side aggregate.
//!
//! A course owns its sections, lessons and exercises and is persisted as one
//! unit. The lifecycle (draft → published → archived) gates which mutations
//! are legal: publishing requires at least one section, only published
//! courses can be archived, and an archived course rejects every edit.
//! Validation always runs before mutation, so a rejected operation leaves
//! the tree exactly as it was.

pub mod types;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EntityKind, LearnError, LearnResult};
use crate::events::{DomainEvent, EventPayload};
use crate::ordering;

pub use types::*;

// ----- Slug handling -----

pub const MIN_SLUG_LENGTH: usize = 3;

static SLUG_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s_-]+").unwrap());
static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());
static SLUG_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Derive a slug from a title: lowercase, strip non-word characters,
/// collapse separators into single hyphens, trim leading/trailing hyphens.
pub fn normalize_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lower, "");
    let joined = SLUG_SEPARATORS.replace_all(stripped.trim(), "-");
    joined.trim_matches('-').to_string()
}

pub fn validate_slug(slug: &str) -> LearnResult<()> {
    if slug.len() < MIN_SLUG_LENGTH {
        return Err(LearnError::Validation(format!(
            "Slug must be at least {} characters: '{}'",
            MIN_SLUG_LENGTH, slug
        )));
    }
    if !SLUG_SHAPE.is_match(slug) {
        return Err(LearnError::Validation(format!(
            "Slug must be lowercase-hyphenated: '{}'",
            slug
        )));
    }
    Ok(())
}

// ----- Aggregate root -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub metadata: CourseMetadata,
    pub status: CourseStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub sections: Vec<Section>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Course {
    pub fn create(req: CreateCourseRequest, author_id: Uuid) -> LearnResult<Self> {
        let slug = match req.slug {
            Some(slug) => slug,
            None => normalize_slug(&req.title),
        };
        validate_slug(&slug)?;

        let now = Utc::now();
        let mut course = Self {
            id: Uuid::new_v4(),
            title: req.title,
            slug,
            description: req.description,
            metadata: req.metadata.unwrap_or_default(),
            status: CourseStatus::Draft,
            published_at: None,
            author_id,
            sections: Vec::new(),
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };
        course.record(EventPayload::CourseCreated {
            course_id: course.id,
            author_id,
            slug: course.slug.clone(),
        });
        Ok(course)
    }

    /// Drain the buffered domain events.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, payload: EventPayload) {
        self.events.push(DomainEvent::new(payload));
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn ensure_editable(&self) -> LearnResult<()> {
        if self.status == CourseStatus::Archived {
            return Err(LearnError::InvalidTransition(format!(
                "Course {} is archived and cannot be edited",
                self.id
            )));
        }
        Ok(())
    }

    // ----- Lifecycle -----

    pub fn publish(&mut self) -> LearnResult<()> {
        if self.status != CourseStatus::Draft {
            return Err(LearnError::InvalidTransition(format!(
                "Course {} cannot be published from {}",
                self.id, self.status
            )));
        }
        if self.sections.is_empty() {
            return Err(LearnError::InvalidTransition(format!(
                "Course {} cannot be published without sections",
                self.id
            )));
        }
        self.status = CourseStatus::Published;
        self.published_at = Some(Utc::now());
        self.touch();
        self.record(EventPayload::CoursePublished {
            course_id: self.id,
            author_id: self.author_id,
        });
        Ok(())
    }

    pub fn unpublish(&mut self) -> LearnResult<()> {
        if self.status != CourseStatus::Published {
            return Err(LearnError::InvalidTransition(format!(
                "Course {} cannot be unpublished from {}",
                self.id, self.status
            )));
        }
        self.status = CourseStatus::Draft;
        self.published_at = None;
        self.touch();
        Ok(())
    }

    pub fn archive(&mut self) -> LearnResult<()> {
        if self.status != CourseStatus::Published {
            return Err(LearnError::InvalidTransition(format!(
                "Course {} cannot be archived from {}",
                self.id, self.status
            )));
        }
        self.status = CourseStatus::Archived;
        self.touch();
        Ok(())
    }

    /// Apply only the supplied fields. A slug change is validated first so a
    /// rejected update leaves everything untouched.
    pub fn update_basic_info(&mut self, req: UpdateCourseRequest) -> LearnResult<()> {
        self.ensure_editable()?;
        if let Some(slug) = &req.slug {
            validate_slug(slug)?;
        }
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(description) = req.description {
            self.description = Some(description);
        }
        if let Some(slug) = req.slug {
            self.slug = slug;
        }
        if let Some(metadata) = req.metadata {
            self.metadata = metadata;
        }
        self.touch();
        Ok(())
    }

    // ----- Structural mutations -----

    pub fn add_section(&mut self, req: CreateSectionRequest) -> LearnResult<Uuid> {
        self.ensure_editable()?;
        let section = Section {
            id: Uuid::new_v4(),
            course_id: self.id,
            title: req.title,
            description: req.description,
            order: self.sections.len() as u32,
            lessons: Vec::new(),
        };
        let id = section.id;
        self.sections.push(section);
        self.touch();
        Ok(id)
    }

    pub fn add_lesson(&mut self, section_id: Uuid, req: CreateLessonRequest) -> LearnResult<Uuid> {
        self.ensure_editable()?;
        let section = self.section_mut(section_id)?;
        let lesson = Lesson {
            id: Uuid::new_v4(),
            section_id,
            title: req.title,
            description: req.description,
            order: section.lessons.len() as u32,
            estimated_duration_minutes: req.estimated_duration_minutes,
            status: req.status.unwrap_or_else(|| "draft".to_string()),
            exercises: Vec::new(),
        };
        let id = lesson.id;
        section.lessons.push(lesson);
        self.touch();
        Ok(id)
    }

    pub fn add_exercise(&mut self, lesson_id: Uuid, req: CreateExerciseRequest) -> LearnResult<Uuid> {
        self.ensure_editable()?;
        req.content.validate()?;
        let lesson = self.lesson_mut(lesson_id)?;
        let exercise = Exercise {
            id: Uuid::new_v4(),
            lesson_id,
            title: req.title,
            order: lesson.exercises.len() as u32,
            estimated_duration_minutes: req.estimated_duration_minutes,
            content: req.content,
        };
        let id = exercise.id;
        lesson.exercises.push(exercise);
        self.touch();
        Ok(id)
    }

    pub fn update_lesson(&mut self, lesson_id: Uuid, req: UpdateLessonRequest) -> LearnResult<()> {
        self.ensure_editable()?;
        let lesson = self.lesson_mut(lesson_id)?;
        if let Some(title) = req.title {
            lesson.title = title;
        }
        if let Some(description) = req.description {
            lesson.description = Some(description);
        }
        if let Some(duration) = req.estimated_duration_minutes {
            lesson.estimated_duration_minutes = Some(duration);
        }
        if let Some(status) = req.status {
            lesson.status = status;
        }
        self.touch();
        Ok(())
    }

    /// Only title, content and duration are mutable after creation; order
    /// changes go through [`Course::reorder_exercises`].
    pub fn update_exercise(&mut self, exercise_id: Uuid, req: UpdateExerciseRequest) -> LearnResult<()> {
        self.ensure_editable()?;
        if let Some(content) = &req.content {
            content.validate()?;
        }
        let exercise = self.exercise_mut(exercise_id)?;
        if let Some(title) = req.title {
            exercise.title = title;
        }
        if let Some(duration) = req.estimated_duration_minutes {
            exercise.estimated_duration_minutes = Some(duration);
        }
        if let Some(content) = req.content {
            exercise.content = content;
        }
        self.touch();
        Ok(())
    }

    pub fn remove_section(&mut self, section_id: Uuid) -> LearnResult<()> {
        self.ensure_editable()?;
        let idx = self
            .sections
            .iter()
            .position(|s| s.id == section_id)
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Section,
                id: section_id,
            })?;
        self.sections.remove(idx);
        ordering::reindex(&mut self.sections);
        self.touch();
        Ok(())
    }

    pub fn remove_lesson(&mut self, lesson_id: Uuid) -> LearnResult<()> {
        self.ensure_editable()?;
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.lessons.iter().any(|l| l.id == lesson_id))
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Lesson,
                id: lesson_id,
            })?;
        section.lessons.retain(|l| l.id != lesson_id);
        ordering::reindex(&mut section.lessons);
        self.touch();
        Ok(())
    }

    pub fn remove_exercise(&mut self, exercise_id: Uuid) -> LearnResult<()> {
        self.ensure_editable()?;
        let lesson = self
            .sections
            .iter_mut()
            .flat_map(|s| s.lessons.iter_mut())
            .find(|l| l.exercises.iter().any(|e| e.id == exercise_id))
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Exercise,
                id: exercise_id,
            })?;
        lesson.exercises.retain(|e| e.id != exercise_id);
        ordering::reindex(&mut lesson.exercises);
        self.touch();
        Ok(())
    }

    pub fn reorder_sections(&mut self, ids: &[Uuid]) -> LearnResult<()> {
        self.ensure_editable()?;
        ordering::apply_order(&mut self.sections, ids)?;
        self.touch();
        Ok(())
    }

    pub fn reorder_lessons(&mut self, section_id: Uuid, ids: &[Uuid]) -> LearnResult<()> {
        self.ensure_editable()?;
        let section = self.section_mut(section_id)?;
        ordering::apply_order(&mut section.lessons, ids)?;
        self.touch();
        Ok(())
    }

    pub fn reorder_exercises(&mut self, lesson_id: Uuid, ids: &[Uuid]) -> LearnResult<()> {
        self.ensure_editable()?;
        let lesson = self.lesson_mut(lesson_id)?;
        ordering::apply_order(&mut lesson.exercises, ids)?;
        self.touch();
        Ok(())
    }

    // ----- Tree reads -----

    pub fn section(&self, section_id: Uuid) -> LearnResult<&Section> {
        self.sections
            .iter()
            .find(|s| s.id == section_id)
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Section,
                id: section_id,
            })
    }

    fn section_mut(&mut self, section_id: Uuid) -> LearnResult<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Section,
                id: section_id,
            })
    }

    pub fn find_lesson(&self, lesson_id: Uuid) -> LearnResult<&Lesson> {
        self.sections
            .iter()
            .flat_map(|s| s.lessons.iter())
            .find(|l| l.id == lesson_id)
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Lesson,
                id: lesson_id,
            })
    }

    fn lesson_mut(&mut self, lesson_id: Uuid) -> LearnResult<&mut Lesson> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.lessons.iter_mut())
            .find(|l| l.id == lesson_id)
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Lesson,
                id: lesson_id,
            })
    }

    /// The exercise together with its owning lesson, for structural facts.
    pub fn find_exercise(&self, exercise_id: Uuid) -> LearnResult<(&Lesson, &Exercise)> {
        for section in &self.sections {
            for lesson in &section.lessons {
                if let Some(exercise) = lesson.exercises.iter().find(|e| e.id == exercise_id) {
                    return Ok((lesson, exercise));
                }
            }
        }
        Err(LearnError::NotFound {
            kind: EntityKind::Exercise,
            id: exercise_id,
        })
    }

    fn exercise_mut(&mut self, exercise_id: Uuid) -> LearnResult<&mut Exercise> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.lessons.iter_mut())
            .flat_map(|l| l.exercises.iter_mut())
            .find(|e| e.id == exercise_id)
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Exercise,
                id: exercise_id,
            })
    }

    pub fn total_lessons(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_course() -> Course {
        Course::create(
            CreateCourseRequest {
                title: "Intro to Rust".to_string(),
                description: Some("Ownership and borrowing".to_string()),
                slug: None,
                metadata: None,
            },
            Uuid::new_v4(),
        )
        .unwrap()
    }

    fn material() -> ExerciseContent {
        ExerciseContent::Material {
            body: "Read this".to_string(),
            images: Vec::new(),
        }
    }

    #[test]
    fn slug_is_derived_from_title() {
        let course = draft_course();
        assert_eq!(course.slug, "intro-to-rust");
    }

    #[test]
    fn normalize_slug_strips_and_collapses() {
        assert_eq!(normalize_slug("Hello, World!"), "hello-world");
        assert_eq!(normalize_slug("  Async --- Rust_IO  "), "async-rust-io");
        assert_eq!(normalize_slug("C++ 101"), "c-101");
    }

    #[test]
    fn explicit_malformed_slug_is_rejected() {
        let result = Course::create(
            CreateCourseRequest {
                title: "Intro".to_string(),
                description: None,
                slug: Some("Bad Slug!".to_string()),
                metadata: None,
            },
            Uuid::new_v4(),
        );
        assert!(matches!(result, Err(LearnError::Validation(_))));
    }

    #[test]
    fn publish_requires_a_section() {
        let mut course = draft_course();
        let err = course.publish().unwrap_err();
        assert!(matches!(err, LearnError::InvalidTransition(_)));
        assert_eq!(course.status, CourseStatus::Draft);
        assert!(course.published_at.is_none());

        course
            .add_section(CreateSectionRequest {
                title: "Basics".to_string(),
                description: None,
            })
            .unwrap();
        course.publish().unwrap();
        assert_eq!(course.status, CourseStatus::Published);
        assert!(course.published_at.is_some());
    }

    #[test]
    fn published_course_still_accepts_edits_until_archived() {
        let mut course = draft_course();
        let section_id = course
            .add_section(CreateSectionRequest {
                title: "Basics".to_string(),
                description: None,
            })
            .unwrap();
        course.publish().unwrap();

        // editing published content is fine
        let lesson_id = course
            .add_lesson(
                section_id,
                CreateLessonRequest {
                    title: "Variables".to_string(),
                    description: None,
                    estimated_duration_minutes: Some(10),
                    status: None,
                },
            )
            .unwrap();
        assert_eq!(course.find_lesson(lesson_id).unwrap().status, "draft");

        course.archive().unwrap();
        let err = course
            .add_lesson(
                section_id,
                CreateLessonRequest {
                    title: "Shadowing".to_string(),
                    description: None,
                    estimated_duration_minutes: None,
                    status: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LearnError::InvalidTransition(_)));
        let err = course.reorder_sections(&[section_id]).unwrap_err();
        assert!(matches!(err, LearnError::InvalidTransition(_)));
    }

    #[test]
    fn archive_requires_published() {
        let mut course = draft_course();
        assert!(course.archive().is_err());
    }

    #[test]
    fn unpublish_reverts_to_draft_and_clears_timestamp() {
        let mut course = draft_course();
        course
            .add_section(CreateSectionRequest {
                title: "Basics".to_string(),
                description: None,
            })
            .unwrap();
        course.publish().unwrap();
        course.unpublish().unwrap();
        assert_eq!(course.status, CourseStatus::Draft);
        assert!(course.published_at.is_none());
    }

    #[test]
    fn removal_reindexes_siblings() {
        let mut course = draft_course();
        let s1 = course
            .add_section(CreateSectionRequest {
                title: "One".to_string(),
                description: None,
            })
            .unwrap();
        let _s2 = course
            .add_section(CreateSectionRequest {
                title: "Two".to_string(),
                description: None,
            })
            .unwrap();
        let s3 = course
            .add_section(CreateSectionRequest {
                title: "Three".to_string(),
                description: None,
            })
            .unwrap();

        course.remove_section(s1).unwrap();
        let orders: Vec<u32> = course.sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(course.sections[1].id, s3);
    }

    #[test]
    fn remove_unknown_exercise_names_the_id() {
        let mut course = draft_course();
        let missing = Uuid::new_v4();
        let err = course.remove_exercise(missing).unwrap_err();
        assert_eq!(
            err,
            LearnError::NotFound {
                kind: EntityKind::Exercise,
                id: missing
            }
        );
    }

    #[test]
    fn reorder_with_wrong_count_leaves_order_unchanged() {
        let mut course = draft_course();
        let section_id = course
            .add_section(CreateSectionRequest {
                title: "Basics".to_string(),
                description: None,
            })
            .unwrap();
        let l1 = course
            .add_lesson(
                section_id,
                CreateLessonRequest {
                    title: "A".to_string(),
                    description: None,
                    estimated_duration_minutes: None,
                    status: None,
                },
            )
            .unwrap();
        let l2 = course
            .add_lesson(
                section_id,
                CreateLessonRequest {
                    title: "B".to_string(),
                    description: None,
                    estimated_duration_minutes: None,
                    status: None,
                },
            )
            .unwrap();
        let l3 = course
            .add_lesson(
                section_id,
                CreateLessonRequest {
                    title: "C".to_string(),
                    description: None,
                    estimated_duration_minutes: None,
                    status: None,
                },
            )
            .unwrap();

        let err = course.reorder_lessons(section_id, &[l1, l2]).unwrap_err();
        assert!(matches!(err, LearnError::Validation(_)));
        let ids: Vec<Uuid> = course.section(section_id).unwrap().lessons.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![l1, l2, l3]);

        course.reorder_lessons(section_id, &[l3, l1, l2]).unwrap();
        let ids: Vec<Uuid> = course.section(section_id).unwrap().lessons.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![l3, l1, l2]);
    }

    #[test]
    fn add_exercise_validates_content() {
        let mut course = draft_course();
        let section_id = course
            .add_section(CreateSectionRequest {
                title: "Basics".to_string(),
                description: None,
            })
            .unwrap();
        let lesson_id = course
            .add_lesson(
                section_id,
                CreateLessonRequest {
                    title: "A".to_string(),
                    description: None,
                    estimated_duration_minutes: None,
                    status: None,
                },
            )
            .unwrap();

        let err = course
            .add_exercise(
                lesson_id,
                CreateExerciseRequest {
                    title: "Broken video".to_string(),
                    estimated_duration_minutes: None,
                    content: ExerciseContent::Video {
                        source_id: "vid-1".to_string(),
                        duration_seconds: 0,
                        resume_position_seconds: None,
                    },
                },
            )
            .unwrap_err();
        assert!(matches!(err, LearnError::Validation(_)));

        let id = course
            .add_exercise(
                lesson_id,
                CreateExerciseRequest {
                    title: "Reading".to_string(),
                    estimated_duration_minutes: Some(5),
                    content: material(),
                },
            )
            .unwrap();
        let (lesson, exercise) = course.find_exercise(id).unwrap();
        assert_eq!(lesson.id, lesson_id);
        assert_eq!(exercise.exercise_type(), ExerciseType::Material);
        assert_eq!(exercise.order, 0);
    }

    #[test]
    fn create_and_publish_record_events() {
        let mut course = draft_course();
        course
            .add_section(CreateSectionRequest {
                title: "Basics".to_string(),
                description: None,
            })
            .unwrap();
        course.publish().unwrap();

        let names: Vec<&str> = course.take_events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["course_created", "course_published"]);
        assert!(course.take_events().is_empty());
    }
}
