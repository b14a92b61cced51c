//! # Learncore - Learning Platform Core
//!
//! The course content tree and the student progress engine:
//! - Course authoring with a draft → published → archived lifecycle
//! - Ordered sections, lessons and exercises with stable 0-based ordering
//! - Polymorphic exercise content (video, quiz, material, assignment, coding)
//! - Quiz grading with scalar and set-valued answers
//! - Per-student progress with an exercise → lesson completion cascade
//! - Domain events for downstream XP, badge and analytics consumers
//!
//! ## Architecture
//!
//! - Plain serde models with UUID identifiers
//! - Two independent aggregates: [`Course`] (authoring) and
//!   [`StudentProgress`] (learning), linked only by identifiers
//! - [`LearnEngine`] runs load → mutate → save cycles and drains domain
//!   events after each successful save
//! - Persistence and event delivery live behind the [`store`] traits;
//!   [`memory`] ships in-memory implementations for tests and embedding

pub mod config;
pub mod course;
pub mod engine;
pub mod error;
pub mod events;
pub mod memory;
pub mod ordering;
pub mod progress;
pub mod store;

pub use config::LearnConfig;
pub use course::Course;
pub use engine::LearnEngine;
pub use error::{EntityKind, LearnError, LearnResult};
pub use events::{DomainEvent, EventPayload};
pub use progress::StudentProgress;
