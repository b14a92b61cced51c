//! Student progress: per-student, per-course completion tracking.
//!
//! The aggregate owns one [`ExerciseProgress`] and one [`LessonProgress`]
//! record per touched exercise/lesson, created lazily on first activity;
//! absence means "not started", never an error. Completion flags only move
//! from false to true. When an exercise transitions, the change cascades
//! into the owning lesson's counter and, when the counter reaches the
//! lesson's exercise count, into a lesson completion. Structural facts
//! (exercise counts) come in as plain [`LessonSnapshot`] parameters read
//! from the course tree at call time; the two aggregates never hold
//! references into each other.

pub mod quiz;
pub mod types;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::events::{DomainEvent, EventPayload};

pub use types::*;

/// Aggregate root for a (student, course) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProgress {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub lessons: HashMap<Uuid, LessonProgress>,
    pub exercises: HashMap<Uuid, ExerciseProgress>,
    /// Bumped on every mutating call; lets a store implement optimistic
    /// concurrency across concurrent load → mutate → save cycles.
    pub version: u64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl StudentProgress {
    pub fn new(student_id: Uuid, course_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            student_id,
            course_id,
            lessons: HashMap::new(),
            exercises: HashMap::new(),
            version: 0,
            started_at: now,
            updated_at: now,
            events: Vec::new(),
        }
    }

    /// Drain the buffered domain events.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, payload: EventPayload) {
        self.events.push(DomainEvent::new(payload));
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    fn exercise_record(&mut self, exercise_id: Uuid) -> &mut ExerciseProgress {
        let student_id = self.student_id;
        self.exercises
            .entry(exercise_id)
            .or_insert_with(|| ExerciseProgress::new(student_id, exercise_id))
    }

    fn lesson_record(&mut self, snapshot: &LessonSnapshot) -> &mut LessonProgress {
        let student_id = self.student_id;
        let lesson = self
            .lessons
            .entry(snapshot.lesson_id)
            .or_insert_with(|| {
                LessonProgress::new(student_id, snapshot.lesson_id, snapshot.total_exercises)
            });
        // refresh the structural snapshot; the counter may never exceed it
        lesson.total_exercises = snapshot.total_exercises;
        if lesson.exercises_completed > lesson.total_exercises {
            lesson.exercises_completed = lesson.total_exercises;
        }
        lesson
    }

    // ----- Activity signals -----

    /// Generic completion: assignments, coding exercises and the explicit
    /// "mark done" path. Unconditional transition if not already completed.
    pub fn complete_exercise(&mut self, snapshot: &LessonSnapshot, exercise_id: Uuid) -> ProgressUpdate {
        let now = Utc::now();
        self.touch(now);
        self.lesson_record(snapshot);
        let transitioned = self.exercise_record(exercise_id).mark_completed(now);
        self.cascade(snapshot, exercise_id, transitioned, now)
    }

    /// Video signal: keeps the furthest watch position and completes once the
    /// watched share of `total_seconds` reaches `completion_threshold`.
    pub fn record_video(
        &mut self,
        snapshot: &LessonSnapshot,
        exercise_id: Uuid,
        watched_seconds: u32,
        total_seconds: u32,
        completion_threshold: f64,
    ) -> ProgressUpdate {
        let now = Utc::now();
        self.touch(now);
        self.lesson_record(snapshot);
        let record = self.exercise_record(exercise_id);
        if watched_seconds > record.watched_seconds {
            record.watched_seconds = watched_seconds;
        }
        let watched_through =
            f64::from(watched_seconds) >= completion_threshold * f64::from(total_seconds);
        let transitioned = watched_through && record.mark_completed(now);
        self.cascade(snapshot, exercise_id, transitioned, now)
    }

    /// Material signal: scroll depth is clamped to 0-100 and completes only
    /// at full depth.
    pub fn record_scroll(
        &mut self,
        snapshot: &LessonSnapshot,
        exercise_id: Uuid,
        scroll_depth: u32,
    ) -> ProgressUpdate {
        let now = Utc::now();
        self.touch(now);
        self.lesson_record(snapshot);
        let record = self.exercise_record(exercise_id);
        let depth = scroll_depth.min(100) as u8;
        if depth > record.scroll_depth {
            record.scroll_depth = depth;
        }
        let transitioned = depth >= 100 && record.mark_completed(now);
        self.cascade(snapshot, exercise_id, transitioned, now)
    }

    /// Propagate an exercise transition into the owning lesson. No
    /// transition means no counter change and no events.
    fn cascade(
        &mut self,
        snapshot: &LessonSnapshot,
        exercise_id: Uuid,
        transitioned: bool,
        now: DateTime<Utc>,
    ) -> ProgressUpdate {
        if !transitioned {
            return ProgressUpdate::default();
        }

        let lesson_completed = {
            let lesson = self.lesson_record(snapshot);
            lesson.exercises_completed = (lesson.exercises_completed + 1).min(lesson.total_exercises);
            if !lesson.completed && lesson.exercises_completed >= lesson.total_exercises {
                lesson.completed = true;
                lesson.completed_at = Some(now);
                true
            } else {
                false
            }
        };

        self.record(EventPayload::ExerciseCompleted {
            student_id: self.student_id,
            course_id: self.course_id,
            lesson_id: snapshot.lesson_id,
            exercise_id,
        });
        if lesson_completed {
            self.record(EventPayload::LessonCompleted {
                student_id: self.student_id,
                course_id: self.course_id,
                lesson_id: snapshot.lesson_id,
            });
        }

        ProgressUpdate {
            exercise_completed: true,
            lesson_completed,
        }
    }

    // ----- Reads -----

    /// Rounded percentage of completed lessons against an externally
    /// supplied lesson count; 0 when the course has no lessons.
    pub fn course_progress(&self, total_lessons: usize) -> u32 {
        if total_lessons == 0 {
            return 0;
        }
        let completed = self.lessons.values().filter(|l| l.completed).count();
        (completed as f64 / total_lessons as f64 * 100.0).round() as u32
    }
}
