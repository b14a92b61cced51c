//! Types for student progress tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::course::QuizAnswer;

// ----- Progress records -----

/// Per-exercise activity record. Created lazily on first signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub student_id: Uuid,
    pub exercise_id: Uuid,
    pub completed: bool,
    pub watched_seconds: u32,
    /// 0-100, clamped on write.
    pub scroll_depth: u8,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExerciseProgress {
    pub(crate) fn new(student_id: Uuid, exercise_id: Uuid) -> Self {
        Self {
            student_id,
            exercise_id,
            completed: false,
            watched_seconds: 0,
            scroll_depth: 0,
            completed_at: None,
        }
    }

    /// Returns true only on the not-completed → completed transition.
    pub(crate) fn mark_completed(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        true
    }
}

/// Per-lesson counter record, seeded with the lesson's exercise count as
/// read from the course tree at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
    pub student_id: Uuid,
    pub lesson_id: Uuid,
    pub completed: bool,
    pub exercises_completed: u32,
    pub total_exercises: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LessonProgress {
    pub(crate) fn new(student_id: Uuid, lesson_id: Uuid, total_exercises: u32) -> Self {
        Self {
            student_id,
            lesson_id,
            completed: false,
            exercises_completed: 0,
            total_exercises,
            completed_at: None,
        }
    }
}

/// Structural facts about a lesson, read from the course tree at call time.
/// Progress never holds a reference into the course graph, only ids.
#[derive(Debug, Clone, Copy)]
pub struct LessonSnapshot {
    pub lesson_id: Uuid,
    pub total_exercises: u32,
}

/// Completion transitions caused by a single progress call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub exercise_completed: bool,
    pub lesson_completed: bool,
}

// ----- Quiz DTOs -----

/// Learner answers keyed by question id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub answers: HashMap<Uuid, QuizAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    /// Rounded percentage of correct answers.
    pub score: u32,
    pub passing_score: u32,
    pub passed: bool,
    pub correct_count: u32,
    pub total_questions: u32,
    pub breakdown: Vec<AnswerResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    pub question_id: Uuid,
    pub is_correct: bool,
    pub correct_answer: QuizAnswer,
    pub submitted_answer: Option<QuizAnswer>,
    pub explanation: Option<String>,
}

/// Graded quiz plus any progress transitions it caused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub result: QuizResult,
    pub progress: ProgressUpdate,
}
