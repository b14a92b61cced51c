//! The orchestration engine.
//!
//! Every operation follows the same shape: load the aggregate, mutate it in
//! memory, save it once, then drain its buffered events into the sink. A
//! failed operation saves nothing and publishes nothing. Learning-time
//! operations load the course read-only for structural facts and only ever
//! write the progress aggregate.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::LearnConfig;
use crate::course::{
    Course, CreateCourseRequest, CreateExerciseRequest, CreateLessonRequest, CreateSectionRequest,
    ExerciseContent, UpdateCourseRequest, UpdateExerciseRequest, UpdateLessonRequest,
};
use crate::error::{EntityKind, LearnError, LearnResult};
use crate::events::DomainEvent;
use crate::progress::{
    quiz, LessonSnapshot, ProgressUpdate, QuizOutcome, QuizSubmission, StudentProgress,
};
use crate::store::{CourseStore, EventSink, ProgressStore};

pub struct LearnEngine {
    courses: Arc<dyn CourseStore>,
    progress: Arc<dyn ProgressStore>,
    events: Arc<dyn EventSink>,
    config: LearnConfig,
}

impl LearnEngine {
    pub fn new(
        courses: Arc<dyn CourseStore>,
        progress: Arc<dyn ProgressStore>,
        events: Arc<dyn EventSink>,
        config: LearnConfig,
    ) -> Self {
        Self {
            courses,
            progress,
            events,
            config,
        }
    }

    // ----- Plumbing -----

    async fn load_course(&self, course_id: Uuid) -> LearnResult<Course> {
        self.courses
            .load(course_id)
            .await?
            .ok_or(LearnError::NotFound {
                kind: EntityKind::Course,
                id: course_id,
            })
    }

    async fn persist_course(&self, course: &mut Course) -> LearnResult<()> {
        let events = course.take_events();
        self.courses.save(course).await?;
        self.emit(events).await;
        Ok(())
    }

    async fn persist_progress(&self, progress: &mut StudentProgress) -> LearnResult<()> {
        let events = progress.take_events();
        self.progress.save(progress).await?;
        self.emit(events).await;
        Ok(())
    }

    /// Events only become observable after the save that produced them, so
    /// sink failures are logged rather than bubbled into the caller.
    async fn emit(&self, events: Vec<DomainEvent>) {
        for event in events {
            if let Err(e) = self.events.publish(event).await {
                tracing::warn!("Event publish failed: {}", e);
            }
        }
    }

    // ----- Authoring -----

    pub async fn create_course(
        &self,
        req: CreateCourseRequest,
        author_id: Uuid,
    ) -> LearnResult<Course> {
        let mut course = Course::create(req, author_id)?;
        if self.courses.find_by_slug(&course.slug).await?.is_some() {
            return Err(LearnError::Validation(format!(
                "Slug already in use: '{}'",
                course.slug
            )));
        }
        tracing::debug!("Creating course {} ('{}')", course.id, course.slug);
        self.persist_course(&mut course).await?;
        Ok(course)
    }

    pub async fn get_course(&self, course_id: Uuid) -> LearnResult<Course> {
        self.load_course(course_id).await
    }

    pub async fn update_course_info(
        &self,
        course_id: Uuid,
        req: UpdateCourseRequest,
    ) -> LearnResult<Course> {
        let mut course = self.load_course(course_id).await?;
        if let Some(slug) = &req.slug {
            if let Some(existing) = self.courses.find_by_slug(slug).await? {
                if existing.id != course_id {
                    return Err(LearnError::Validation(format!(
                        "Slug already in use: '{}'",
                        slug
                    )));
                }
            }
        }
        course.update_basic_info(req)?;
        self.persist_course(&mut course).await?;
        Ok(course)
    }

    pub async fn publish_course(&self, course_id: Uuid) -> LearnResult<Course> {
        let mut course = self.load_course(course_id).await?;
        course.publish()?;
        tracing::info!("Publishing course {}", course_id);
        self.persist_course(&mut course).await?;
        Ok(course)
    }

    pub async fn unpublish_course(&self, course_id: Uuid) -> LearnResult<Course> {
        let mut course = self.load_course(course_id).await?;
        course.unpublish()?;
        self.persist_course(&mut course).await?;
        Ok(course)
    }

    pub async fn archive_course(&self, course_id: Uuid) -> LearnResult<Course> {
        let mut course = self.load_course(course_id).await?;
        course.archive()?;
        tracing::info!("Archiving course {}", course_id);
        self.persist_course(&mut course).await?;
        Ok(course)
    }

    pub async fn add_section(
        &self,
        course_id: Uuid,
        req: CreateSectionRequest,
    ) -> LearnResult<Uuid> {
        let mut course = self.load_course(course_id).await?;
        let section_id = course.add_section(req)?;
        self.persist_course(&mut course).await?;
        Ok(section_id)
    }

    pub async fn add_lesson(
        &self,
        course_id: Uuid,
        section_id: Uuid,
        req: CreateLessonRequest,
    ) -> LearnResult<Uuid> {
        let mut course = self.load_course(course_id).await?;
        let lesson_id = course.add_lesson(section_id, req)?;
        self.persist_course(&mut course).await?;
        Ok(lesson_id)
    }

    pub async fn add_exercise(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
        req: CreateExerciseRequest,
    ) -> LearnResult<Uuid> {
        let mut course = self.load_course(course_id).await?;
        let exercise_id = course.add_exercise(lesson_id, req)?;
        self.persist_course(&mut course).await?;
        Ok(exercise_id)
    }

    pub async fn update_lesson(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
        req: UpdateLessonRequest,
    ) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.update_lesson(lesson_id, req)?;
        self.persist_course(&mut course).await
    }

    pub async fn update_exercise(
        &self,
        course_id: Uuid,
        exercise_id: Uuid,
        req: UpdateExerciseRequest,
    ) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.update_exercise(exercise_id, req)?;
        self.persist_course(&mut course).await
    }

    pub async fn remove_section(&self, course_id: Uuid, section_id: Uuid) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.remove_section(section_id)?;
        self.persist_course(&mut course).await
    }

    pub async fn remove_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.remove_lesson(lesson_id)?;
        self.persist_course(&mut course).await
    }

    pub async fn remove_exercise(&self, course_id: Uuid, exercise_id: Uuid) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.remove_exercise(exercise_id)?;
        self.persist_course(&mut course).await
    }

    pub async fn reorder_sections(&self, course_id: Uuid, ids: &[Uuid]) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.reorder_sections(ids)?;
        self.persist_course(&mut course).await
    }

    pub async fn reorder_lessons(
        &self,
        course_id: Uuid,
        section_id: Uuid,
        ids: &[Uuid],
    ) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.reorder_lessons(section_id, ids)?;
        self.persist_course(&mut course).await
    }

    pub async fn reorder_exercises(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
        ids: &[Uuid],
    ) -> LearnResult<()> {
        let mut course = self.load_course(course_id).await?;
        course.reorder_exercises(lesson_id, ids)?;
        self.persist_course(&mut course).await
    }

    // ----- Learning -----

    async fn load_or_start_progress(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> LearnResult<StudentProgress> {
        Ok(self
            .progress
            .load(student_id, course_id)
            .await?
            .unwrap_or_else(|| StudentProgress::new(student_id, course_id)))
    }

    /// Explicit "mark done" path; also used for assignments and coding
    /// exercises, whose completion has no measurable signal here.
    pub async fn complete_exercise(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        exercise_id: Uuid,
    ) -> LearnResult<ProgressUpdate> {
        let course = self.load_course(course_id).await?;
        let (lesson, _) = course.find_exercise(exercise_id)?;
        let snapshot = LessonSnapshot {
            lesson_id: lesson.id,
            total_exercises: lesson.exercises.len() as u32,
        };

        let mut progress = self.load_or_start_progress(student_id, course_id).await?;
        let update = progress.complete_exercise(&snapshot, exercise_id);
        self.persist_progress(&mut progress).await?;
        Ok(update)
    }

    pub async fn record_video_progress(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        exercise_id: Uuid,
        watched_seconds: u32,
    ) -> LearnResult<ProgressUpdate> {
        let course = self.load_course(course_id).await?;
        let (lesson, exercise) = course.find_exercise(exercise_id)?;
        let total_seconds = match &exercise.content {
            ExerciseContent::Video {
                duration_seconds, ..
            } => *duration_seconds,
            other => {
                return Err(LearnError::Validation(format!(
                    "Exercise {} is not a video ({})",
                    exercise_id,
                    other.exercise_type()
                )))
            }
        };
        let snapshot = LessonSnapshot {
            lesson_id: lesson.id,
            total_exercises: lesson.exercises.len() as u32,
        };

        let mut progress = self.load_or_start_progress(student_id, course_id).await?;
        let update = progress.record_video(
            &snapshot,
            exercise_id,
            watched_seconds,
            total_seconds,
            self.config.video_completion_threshold,
        );
        self.persist_progress(&mut progress).await?;
        Ok(update)
    }

    pub async fn record_scroll_progress(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        exercise_id: Uuid,
        scroll_depth: u32,
    ) -> LearnResult<ProgressUpdate> {
        let course = self.load_course(course_id).await?;
        let (lesson, exercise) = course.find_exercise(exercise_id)?;
        if !matches!(exercise.content, ExerciseContent::Material { .. }) {
            return Err(LearnError::Validation(format!(
                "Exercise {} is not reading material ({})",
                exercise_id,
                exercise.exercise_type()
            )));
        }
        let snapshot = LessonSnapshot {
            lesson_id: lesson.id,
            total_exercises: lesson.exercises.len() as u32,
        };

        let mut progress = self.load_or_start_progress(student_id, course_id).await?;
        let update = progress.record_scroll(&snapshot, exercise_id, scroll_depth);
        self.persist_progress(&mut progress).await?;
        Ok(update)
    }

    /// Grade a quiz submission. A pass feeds the generic completion path; a
    /// fail returns the scored breakdown without touching progress state.
    pub async fn submit_quiz(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        exercise_id: Uuid,
        submission: QuizSubmission,
    ) -> LearnResult<QuizOutcome> {
        let course = self.load_course(course_id).await?;
        let (lesson, exercise) = course.find_exercise(exercise_id)?;
        let (questions, passing_score) = match &exercise.content {
            ExerciseContent::Quiz {
                questions,
                passing_score,
                ..
            } => (
                questions,
                passing_score.unwrap_or(self.config.default_passing_score),
            ),
            other => {
                return Err(LearnError::Validation(format!(
                    "Exercise {} is not a quiz ({})",
                    exercise_id,
                    other.exercise_type()
                )))
            }
        };

        let result = quiz::grade(questions, passing_score, &submission);
        if !result.passed {
            tracing::debug!(
                "Quiz {} failed by student {}: score {}",
                exercise_id,
                student_id,
                result.score
            );
            return Ok(QuizOutcome {
                result,
                progress: ProgressUpdate::default(),
            });
        }

        let snapshot = LessonSnapshot {
            lesson_id: lesson.id,
            total_exercises: lesson.exercises.len() as u32,
        };
        let mut progress = self.load_or_start_progress(student_id, course_id).await?;
        let update = progress.complete_exercise(&snapshot, exercise_id);
        self.persist_progress(&mut progress).await?;
        Ok(QuizOutcome {
            result,
            progress: update,
        })
    }

    /// Rounded course completion percentage; a student with no progress
    /// record reads as 0.
    pub async fn course_progress(&self, student_id: Uuid, course_id: Uuid) -> LearnResult<u32> {
        let course = self.load_course(course_id).await?;
        let total_lessons = course.total_lessons();
        Ok(match self.progress.load(student_id, course_id).await? {
            Some(progress) => progress.course_progress(total_lessons),
            None => 0,
        })
    }

    pub async fn student_progress(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> LearnResult<Option<StudentProgress>> {
        self.progress.load(student_id, course_id).await
    }
}
