//! Types for the course content tree

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LearnError, LearnResult};
use crate::ordering::Ordered;

// ----- Lifecycle -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        };
        write!(f, "{}", name)
    }
}

// ----- Tree models -----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseMetadata {
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub estimated_duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order: u32,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order: u32,
    pub estimated_duration_minutes: Option<u32>,
    /// Author-facing workflow label; progress logic never reads it.
    pub status: String,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub order: u32,
    pub estimated_duration_minutes: Option<u32>,
    pub content: ExerciseContent,
}

impl Exercise {
    pub fn exercise_type(&self) -> ExerciseType {
        self.content.exercise_type()
    }
}

impl Ordered for Section {
    fn id(&self) -> Uuid {
        self.id
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Ordered for Lesson {
    fn id(&self) -> Uuid {
        self.id
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Ordered for Exercise {
    fn id(&self) -> Uuid {
        self.id
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

// ----- Exercise content -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Video,
    Quiz,
    Material,
    Assignment,
    CodingChallenge,
    CodingPlayground,
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Quiz => "quiz",
            Self::Material => "material",
            Self::Assignment => "assignment",
            Self::CodingChallenge => "coding_challenge",
            Self::CodingPlayground => "coding_playground",
        };
        write!(f, "{}", name)
    }
}

/// Type-specific content payload, one shape per exercise type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseContent {
    Video {
        source_id: String,
        duration_seconds: u32,
        #[serde(default)]
        resume_position_seconds: Option<u32>,
    },
    Quiz {
        questions: Vec<QuizQuestion>,
        passing_score: Option<u32>,
        max_attempts: Option<u32>,
    },
    Material {
        body: String,
        #[serde(default)]
        images: Vec<String>,
    },
    Assignment {
        instructions: String,
        rubric: Option<String>,
        max_score: Option<u32>,
        due_date: Option<DateTime<Utc>>,
    },
    CodingChallenge {
        instructions: String,
        starter_code: String,
        #[serde(default)]
        test_cases: Vec<CodingTestCase>,
    },
    CodingPlayground {
        instructions: String,
        starter_code: String,
        expected_output: Option<String>,
    },
}

impl ExerciseContent {
    pub fn exercise_type(&self) -> ExerciseType {
        match self {
            Self::Video { .. } => ExerciseType::Video,
            Self::Quiz { .. } => ExerciseType::Quiz,
            Self::Material { .. } => ExerciseType::Material,
            Self::Assignment { .. } => ExerciseType::Assignment,
            Self::CodingChallenge { .. } => ExerciseType::CodingChallenge,
            Self::CodingPlayground { .. } => ExerciseType::CodingPlayground,
        }
    }

    pub fn validate(&self) -> LearnResult<()> {
        match self {
            Self::Video {
                duration_seconds, ..
            } if *duration_seconds == 0 => Err(LearnError::Validation(
                "Video duration must be greater than zero".to_string(),
            )),
            Self::Quiz {
                passing_score: Some(score),
                ..
            } if *score == 0 || *score > 100 => Err(LearnError::Validation(format!(
                "Quiz passing score must be within 1-100, got {}",
                score
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingTestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: QuizAnswer,
    pub explanation: Option<String>,
}

/// A quiz answer: either a single value or a set of values.
///
/// `Many` must stay first so JSON arrays deserialize as sets rather than as
/// a single array-shaped value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizAnswer {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value),
}

// ----- Requests -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub metadata: Option<CourseMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub metadata: Option<CourseMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSectionRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    pub description: Option<String>,
    pub estimated_duration_minutes: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_duration_minutes: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExerciseRequest {
    pub title: String,
    pub estimated_duration_minutes: Option<u32>,
    pub content: ExerciseContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExerciseRequest {
    pub title: Option<String>,
    pub estimated_duration_minutes: Option<u32>,
    pub content: Option<ExerciseContent>,
}
