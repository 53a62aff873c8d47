//! Domain model for projects and their todo items.
//!
//! # Responsibility
//! - Define the canonical `ToDo` and `Project` records used by core logic.
//! - Enforce field-level invariants at construction and on every mutation.
//!
//! # Invariants
//! - Every domain object is identified by a stable v4 UUID.
//! - A todo title and a project name are never blank.
//! - `Project::count` tracks active todos through every mutation path.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod project;
pub mod todo;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Field-level validation failure shared by todo and project mutations.
///
/// The domain never coerces invalid input; the offending call fails and
/// state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Todo title is empty after trimming.
    EmptyTitle,
    /// Priority input is outside the canonical set.
    InvalidPriority(String),
    /// Project name is empty after trimming.
    EmptyProjectName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be blank"),
            Self::InvalidPriority(input) => write!(
                f,
                "invalid priority `{input}`; expected high|medium|low|none"
            ),
            Self::EmptyProjectName => write!(f, "project name must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Kind discriminator embedded in every persisted record.
///
/// Revival dispatches reconstruction by this tag instead of duck-typing on
/// field presence; a record carrying the wrong tag for its position is a
/// deserialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Manager,
    Project,
    Todo,
}

impl RecordKind {
    /// Canonical tag text as it appears in persisted blobs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Project => "project",
            Self::Todo => "todo",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
