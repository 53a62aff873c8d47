//! ToDo domain model.
//!
//! # Responsibility
//! - Define the single task record owned by a project.
//! - Validate title and priority at construction and on every mutation.
//!
//! # Invariants
//! - `id` is stable and never reused for another todo.
//! - `title` is never blank; `priority` is always one of the canonical four.
//! - `complete` starts `false`; `created_at_ms` never changes after creation.

use crate::model::{RecordKind, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a todo record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TodoId = Uuid;

/// Stable identifier for the project that owns a todo.
pub type ProjectId = Uuid;

/// Priority level of a todo.
///
/// Variant order defines ascending rank (none=0, low=1, medium=2, high=3);
/// sorting relies on the derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// No priority assigned.
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parses user input into a canonical priority.
    ///
    /// Accepts `high|medium|low|none` and the empty string, case-insensitively.
    ///
    /// # Errors
    /// - Returns `ValidationError::InvalidPriority` for any other input.
    pub fn parse(input: &str) -> ValidationResult<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ValidationError::InvalidPriority(input.trim().to_string())),
        }
    }

    /// Canonical lowercase form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion state derived from the `complete` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Completion flag is unset.
    Active,
    /// Completion flag is set.
    Complete,
}

/// Field bag for creating or fully editing a todo.
///
/// `priority` holds the raw user input and is parsed during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    /// `None` or a blank string both mean "no due date".
    pub due_date: Option<String>,
    pub priority: String,
    pub notes: String,
}

impl TodoDraft {
    /// Creates a draft with the given title and all other fields empty.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Plain read-only copy of every todo field.
///
/// Used both as the persisted record and as the render model handed to the
/// presentation layer; mutating it never touches live domain state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSnapshot {
    pub kind: RecordKind,
    pub id: TodoId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub priority: Priority,
    pub notes: String,
    pub complete: bool,
    pub created_at_ms: i64,
}

impl TodoSnapshot {
    /// Derived completion status, mirroring [`ToDo::status`].
    pub fn status(&self) -> TodoStatus {
        if self.complete {
            TodoStatus::Complete
        } else {
            TodoStatus::Active
        }
    }
}

/// A single task record with validated fields and a completion flag.
///
/// Fields are module-private; every mutation goes through a setter that
/// enforces its own domain constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToDo {
    id: TodoId,
    project_id: ProjectId,
    title: String,
    description: String,
    due_date: Option<String>,
    priority: Priority,
    notes: String,
    complete: bool,
    created_at_ms: i64,
}

impl ToDo {
    /// Creates a new todo owned by `project_id` from draft fields.
    ///
    /// # Invariants
    /// - Assigns a fresh id and creation timestamp.
    /// - `complete` starts `false` regardless of draft content.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTitle` when the title is blank.
    /// - `ValidationError::InvalidPriority` when the priority input is
    ///   outside `high|medium|low|none|""`.
    pub fn new(project_id: ProjectId, draft: TodoDraft) -> ValidationResult<Self> {
        let title = normalize_title(&draft.title)?;
        let priority = Priority::parse(&draft.priority)?;

        Ok(Self {
            id: Uuid::new_v4(),
            project_id,
            title,
            description: draft.description,
            due_date: normalize_due_date(draft.due_date),
            priority,
            notes: draft.notes,
            complete: false,
            created_at_ms: now_epoch_ms(),
        })
    }

    /// Rebuilds a todo from persisted fields.
    ///
    /// Field validation is skipped: values were validated when the record
    /// was first created.
    pub fn from_snapshot(snapshot: TodoSnapshot) -> Self {
        Self {
            id: snapshot.id,
            project_id: snapshot.project_id,
            title: snapshot.title,
            description: snapshot.description,
            due_date: snapshot.due_date,
            priority: snapshot.priority,
            notes: snapshot.notes,
            complete: snapshot.complete,
            created_at_ms: snapshot.created_at_ms,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn complete(&self) -> bool {
        self.complete
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    /// Derived completion status.
    pub fn status(&self) -> TodoStatus {
        if self.complete {
            TodoStatus::Complete
        } else {
            TodoStatus::Active
        }
    }

    /// Replaces the title.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTitle` when the new title is blank.
    pub fn set_title(&mut self, title: impl Into<String>) -> ValidationResult<()> {
        self.title = normalize_title(&title.into())?;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replaces the due date; blank input clears it.
    pub fn set_due_date(&mut self, due_date: Option<String>) {
        self.due_date = normalize_due_date(due_date);
    }

    /// Replaces the priority from raw input.
    ///
    /// # Errors
    /// - `ValidationError::InvalidPriority` for input outside the canonical set.
    pub fn set_priority(&mut self, priority: &str) -> ValidationResult<()> {
        self.priority = Priority::parse(priority)?;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Applies a full draft in one step.
    ///
    /// Both fallible fields are validated before anything is assigned, so a
    /// failed edit leaves the todo unchanged.
    pub fn apply(&mut self, draft: TodoDraft) -> ValidationResult<()> {
        let title = normalize_title(&draft.title)?;
        let priority = Priority::parse(&draft.priority)?;

        self.title = title;
        self.priority = priority;
        self.description = draft.description;
        self.due_date = normalize_due_date(draft.due_date);
        self.notes = draft.notes;
        Ok(())
    }

    /// Flips the completion flag.
    ///
    /// The caller is responsible for keeping any external active count in
    /// sync; `Project::toggle_complete` is the count-safe path.
    pub fn toggle_complete(&mut self) {
        self.complete = !self.complete;
    }

    /// Plain read-only copy of all fields.
    pub fn snapshot(&self) -> TodoSnapshot {
        TodoSnapshot {
            kind: RecordKind::Todo,
            id: self.id,
            project_id: self.project_id,
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date.clone(),
            priority: self.priority,
            notes: self.notes.clone(),
            complete: self.complete,
            created_at_ms: self.created_at_ms,
        }
    }
}

fn normalize_title(value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn normalize_due_date(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{normalize_due_date, Priority};

    #[test]
    fn priority_parse_accepts_canonical_inputs_case_insensitively() {
        assert_eq!(Priority::parse("HIGH").unwrap(), Priority::High);
        assert_eq!(Priority::parse(" Medium ").unwrap(), Priority::Medium);
        assert_eq!(Priority::parse("low").unwrap(), Priority::Low);
        assert_eq!(Priority::parse("").unwrap(), Priority::None);
        assert_eq!(Priority::parse("None").unwrap(), Priority::None);
    }

    #[test]
    fn priority_order_matches_rank() {
        assert!(Priority::None < Priority::Low);
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn blank_due_dates_normalize_to_none() {
        assert_eq!(normalize_due_date(None), None);
        assert_eq!(normalize_due_date(Some("  ".to_string())), None);
        assert_eq!(
            normalize_due_date(Some(" 2026-03-01 ".to_string())),
            Some("2026-03-01".to_string())
        );
    }
}
