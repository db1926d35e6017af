//! Error taxonomy shared by every domain service

use sea_orm::DbErr;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Caller is not the creator, owner, or applicant the operation requires
    #[error("{0}")]
    Unauthorized(String),

    /// Entity does not exist or is not visible to the caller
    #[error("{0}")]
    NotFound(String),

    /// Wizard stage attempted before the previous one completed
    #[error("Stage {stage} is not available yet: project is at stage {current}")]
    StageSequence { stage: i32, current: i32 },

    /// Team or role slot budget would be exceeded
    #[error("{0}")]
    Capacity(String),

    /// Duplicate application, existing membership, or a transition from a terminal state
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::StageSequence { .. } => "STAGE_SEQUENCE",
            Self::Capacity(_) => "CAPACITY_EXCEEDED",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Internal(_) | Self::Database(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_sequence_message() {
        let err = ServiceError::StageSequence {
            stage: 3,
            current: 1,
        };
        assert_eq!(
            err.to_string(),
            "Stage 3 is not available yet: project is at stage 1"
        );
        assert_eq!(err.code(), "STAGE_SEQUENCE");
    }

    #[test]
    fn test_not_found_helper() {
        assert_eq!(ServiceError::not_found("Project").to_string(), "Project not found");
    }
}
