//! Project domain model.
//!
//! # Responsibility
//! - Own an ordered collection of todos for one named project.
//! - Keep the active-todo count in step with every membership and flag change.
//!
//! # Invariants
//! - `count` is adjusted inside the same method as the mutation it mirrors;
//!   no other code path touches it.
//! - `add` increments unconditionally: new todos are assumed incomplete, and
//!   a caller handing in an already-complete record is still counted.
//! - A failed operation leaves the collection and the count untouched.

use crate::model::todo::{ProjectId, ToDo, TodoDraft, TodoId, TodoSnapshot};
use crate::model::{RecordKind, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ProjectResult<T> = Result<T, ProjectError>;

/// Failure raised by project mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// Field-level validation failed; state is unchanged.
    Validation(ValidationError),
    /// No todo with the given id exists in this project.
    TodoNotFound(TodoId),
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
        }
    }
}

impl Error for ProjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::TodoNotFound(_) => None,
        }
    }
}

impl From<ValidationError> for ProjectError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Plain read-only copy of a project and its todos.
///
/// `count` is persisted verbatim rather than recomputed, so a revived
/// project reports exactly the count it was saved with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub kind: RecordKind,
    pub id: ProjectId,
    pub name: String,
    pub count: usize,
    pub todos: Vec<TodoSnapshot>,
}

/// A named, owned collection of todo records.
///
/// Fields are module-private; membership and the completion flag only change
/// through methods that also adjust the active count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    name: String,
    todos: Vec<ToDo>,
    count: usize,
}

impl Project {
    /// Creates an empty project with a fresh id.
    ///
    /// # Errors
    /// - `ValidationError::EmptyProjectName` when the name is blank.
    pub fn new(name: impl Into<String>) -> ValidationResult<Self> {
        let name = normalize_name(&name.into())?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            todos: Vec::new(),
            count: 0,
        })
    }

    /// Rebuilds a project from persisted fields.
    ///
    /// The persisted `count` is restored verbatim; revival must reproduce the
    /// saved state exactly, drift included.
    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            todos: snapshot.todos.into_iter().map(ToDo::from_snapshot).collect(),
            count: snapshot.count,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maintained count of active (incomplete) todos.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Todos in insertion order.
    pub fn todos(&self) -> &[ToDo] {
        &self.todos
    }

    /// Returns the todo with the given id, if present.
    pub fn get_todo(&self, id: TodoId) -> Option<&ToDo> {
        self.todos.iter().find(|todo| todo.id() == id)
    }

    /// Renames the project.
    ///
    /// # Errors
    /// - `ValidationError::EmptyProjectName` when the new name is blank.
    pub fn rename(&mut self, name: impl Into<String>) -> ValidationResult<()> {
        self.name = normalize_name(&name.into())?;
        Ok(())
    }

    /// Appends a todo and increments the active count.
    ///
    /// The increment is unconditional: the project trusts callers to hand in
    /// fresh, incomplete todos. An already-complete record still counts.
    pub fn add(&mut self, todo: ToDo) {
        self.todos.push(todo);
        self.count += 1;
    }

    /// Removes the todo with the given id and returns it.
    ///
    /// The count is decremented only when the removed todo was active;
    /// complete todos were not counted and must not double-decrement.
    ///
    /// # Errors
    /// - `ProjectError::TodoNotFound` when the id is absent; nothing changes.
    pub fn remove(&mut self, id: TodoId) -> ProjectResult<ToDo> {
        let index = self
            .todos
            .iter()
            .position(|todo| todo.id() == id)
            .ok_or(ProjectError::TodoNotFound(id))?;

        let removed = self.todos.remove(index);
        if !removed.complete() {
            // A revived blob may carry a drifted count; never underflow.
            self.count = self.count.saturating_sub(1);
        }
        Ok(removed)
    }

    /// Flips the completion flag of the todo with the given id.
    ///
    /// The count is adjusted from the pre-toggle state: +1 when a complete
    /// todo becomes active, -1 when an active todo becomes complete.
    ///
    /// # Errors
    /// - `ProjectError::TodoNotFound` when the id is absent; nothing changes.
    pub fn toggle_complete(&mut self, id: TodoId) -> ProjectResult<()> {
        let todo = self
            .todos
            .iter_mut()
            .find(|todo| todo.id() == id)
            .ok_or(ProjectError::TodoNotFound(id))?;

        if todo.complete() {
            self.count += 1;
        } else {
            self.count = self.count.saturating_sub(1);
        }
        todo.toggle_complete();
        Ok(())
    }

    /// Applies a full draft to the todo with the given id.
    ///
    /// Editing never changes the completion flag, so the count is unaffected.
    ///
    /// # Errors
    /// - `ProjectError::TodoNotFound` when the id is absent.
    /// - `ProjectError::Validation` when the draft fails field validation;
    ///   the todo is left unchanged.
    pub fn edit_todo(&mut self, id: TodoId, draft: TodoDraft) -> ProjectResult<()> {
        let todo = self
            .todos
            .iter_mut()
            .find(|todo| todo.id() == id)
            .ok_or(ProjectError::TodoNotFound(id))?;

        todo.apply(draft)?;
        Ok(())
    }

    /// Plain read-only copy of the project and all of its todos.
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            kind: RecordKind::Project,
            id: self.id,
            name: self.name.clone(),
            count: self.count,
            todos: self.todos.iter().map(ToDo::snapshot).collect(),
        }
    }
}

fn normalize_name(value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyProjectName);
    }
    Ok(trimmed.to_string())
}
