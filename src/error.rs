use uuid::Uuid;

/// Entity kinds named by not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Course,
    Section,
    Lesson,
    Exercise,
    Progress,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Course => "course",
            Self::Section => "section",
            Self::Lesson => "lesson",
            Self::Exercise => "exercise",
            Self::Progress => "progress",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LearnError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type LearnResult<T> = Result<T, LearnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_kind_and_id() {
        let id = Uuid::new_v4();
        let err = LearnError::NotFound {
            kind: EntityKind::Lesson,
            id,
        };
        let message = err.to_string();
        assert!(message.contains("lesson"));
        assert!(message.contains(&id.to_string()));
    }
}
