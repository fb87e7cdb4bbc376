//! Validation errors shared by every sub-engine.
//!
//! All checks run before any simulation state is built, so an `Err` never
//! leaves a partially simulated result behind. Unsafe Banker's instances,
//! unplaceable memory requests and empty seek lists are outcomes, not
//! errors, and never appear here.

use thiserror::Error;

/// A rejected problem instance.
///
/// `field` is a path into the request (`processes[2].burst`,
/// `allocation[1]`, `available`) so the front end can surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: must not be empty")]
    Empty { field: String },

    #[error("{field}: must be {constraint}, got {value}")]
    OutOfRange {
        field: String,
        constraint: &'static str,
        value: i64,
    },

    #[error("{field}: duplicate process id `{id}`")]
    DuplicateId { field: String, id: String },

    #[error("{field}: expected {expected} {unit}, got {actual}")]
    Dimension {
        field: String,
        unit: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field}: max demand {max} is below current allocation {allocation}")]
    NegativeNeed {
        field: String,
        max: u32,
        allocation: u32,
    },
}

impl ValidationError {
    /// The request field this error points at.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::DuplicateId { field, .. }
            | ValidationError::Dimension { field, .. }
            | ValidationError::NegativeNeed { field, .. } => field,
        }
    }

    pub(crate) fn empty(field: impl Into<String>) -> Self {
        ValidationError::Empty {
            field: field.into(),
        }
    }

    pub(crate) fn out_of_range(
        field: impl Into<String>,
        constraint: &'static str,
        value: impl TryInto<i64>,
    ) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            constraint,
            value: value.try_into().unwrap_or(i64::MAX),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
