//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated interval identifier.
///
/// Interval IDs are non-empty strings assigned by the store when an interval
/// is first persisted. An interval that has not been persisted yet carries no
/// ID at all (`Option<IntervalId>::None`), so an empty ID is never valid here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IntervalId(String);

impl IntervalId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty {
                field: "interval ID",
            });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IntervalId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IntervalId> for String {
    fn from(id: IntervalId) -> Self {
        id.0
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IntervalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
