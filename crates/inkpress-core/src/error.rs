//! Domain-level error types.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::thread::MAX_THREAD_DEPTH;
use crate::validation::{FieldErrors, missing_reference};

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} not found: {key}")]
    NotFound { entity_type: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A reply was attached to a comment that is already at the deepest allowed level.
    #[error("Comments can only be nested {max_depth} levels deep")]
    DepthExceeded { max_depth: usize },

    #[error("Invalid page: {0}")]
    InvalidPage(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }

    pub fn depth_exceeded() -> Self {
        Self::DepthExceeded {
            max_depth: MAX_THREAD_DEPTH,
        }
    }

    /// Per-field messages for errors the caller can fix by changing the payload.
    ///
    /// `DepthExceeded` is reported against `parent_comment`.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::DepthExceeded { .. } => {
                Some(FieldErrors::single("parent_comment", self.to_string()))
            }
            _ => None,
        }
    }
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint { field } => {
                let message = format!("A record with this {field} already exists.");
                Self::Validation(FieldErrors::single(field, message))
            }
            RepoError::Dangling { field, id } => {
                Self::Validation(FieldErrors::single(field, missing_reference(id)))
            }
            RepoError::NotFound => Self::NotFound {
                entity_type: "Record",
                key: "unknown".to_string(),
            },
            RepoError::Connection(msg) | RepoError::Query(msg) => Self::Internal(msg),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A unique column already holds the value being written.
    #[error("Constraint violation on {field}")]
    Constraint { field: String },

    /// The record points at a row that does not exist.
    #[error("Dangling reference on {field}: {id}")]
    Dangling { field: String, id: Uuid },
}

impl RepoError {
    pub fn constraint(field: impl Into<String>) -> Self {
        Self::Constraint {
            field: field.into(),
        }
    }

    pub fn dangling(field: impl Into<String>, id: Uuid) -> Self {
        Self::Dangling {
            field: field.into(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_exceeded_reports_parent_field() {
        let errors = DomainError::depth_exceeded().field_errors().unwrap();
        assert!(errors.contains("parent_comment"));
    }

    #[test]
    fn test_constraint_becomes_field_error() {
        let err: DomainError = RepoError::constraint("slug").into();
        let errors = err.field_errors().unwrap();
        assert_eq!(
            errors.get("slug").unwrap(),
            ["A record with this slug already exists.".to_string()]
        );
    }

    #[test]
    fn test_dangling_reference_becomes_field_error() {
        let id = Uuid::nil();
        let err: DomainError = RepoError::dangling("post", id).into();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("post").unwrap(), [missing_reference(id)]);
    }

    #[test]
    fn test_not_found_has_no_field_errors() {
        assert!(DomainError::not_found("Post", "missing").field_errors().is_none());
    }
}
