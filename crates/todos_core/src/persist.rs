//! Serialization and revival of the project aggregate.
//!
//! # Responsibility
//! - Encode the full manager state into one JSON blob.
//! - Revive live projects and todos from a persisted blob.
//!
//! # Invariants
//! - Every persisted record carries its `RecordKind` tag; revival dispatches
//!   by tag and rejects a record whose tag is wrong for its position.
//! - Revival skips field re-validation (values were validated at creation)
//!   and preserves persisted counts verbatim.
//! - `revive(serialize(m))` is observationally equal to `m` for every query.

use crate::events::EventBus;
use crate::manager::{ManagerSnapshot, ProjectManager};
use crate::model::project::Project;
use crate::model::todo::{ProjectId, TodoId};
use crate::model::RecordKind;
use indexmap::IndexMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, DeserializationError>;

/// Failure raised when a persisted blob cannot be revived.
#[derive(Debug)]
pub enum DeserializationError {
    /// The blob is not valid JSON for the persisted shape, or carries an
    /// unknown enum marker.
    Malformed(serde_json::Error),
    /// A record carries a kind tag that is wrong for its position.
    KindMismatch {
        expected: RecordKind,
        found: RecordKind,
    },
    /// Two persisted projects share one id.
    DuplicateProject(ProjectId),
    /// A todo's owning project id differs from the project that contains it.
    ForeignTodo {
        todo_id: TodoId,
        project_id: ProjectId,
    },
    /// The persisted default project id is not among the revived projects.
    DefaultProjectMissing(ProjectId),
}

impl Display for DeserializationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed state blob: {err}"),
            Self::KindMismatch { expected, found } => {
                write!(f, "record kind mismatch: expected `{expected}`, found `{found}`")
            }
            Self::DuplicateProject(id) => write!(f, "duplicate project id in state blob: {id}"),
            Self::ForeignTodo {
                todo_id,
                project_id,
            } => write!(f, "todo {todo_id} does not belong to project {project_id}"),
            Self::DefaultProjectMissing(id) => {
                write!(f, "default project {id} is not among the revived projects")
            }
        }
    }
}

impl Error for DeserializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DeserializationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

/// Serializes the whole aggregate into one JSON blob.
pub fn serialize(manager: &ProjectManager) -> Result<String, serde_json::Error> {
    encode(&manager.snapshot())
}

/// Encodes an already-taken snapshot into the persisted blob form.
///
/// Used by the store collaborator, which receives snapshots through
/// state-change notifications.
pub fn encode(snapshot: &ManagerSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Revives a manager from a persisted blob.
///
/// # Errors
/// - `DeserializationError::Malformed` when the blob is not the persisted
///   JSON shape.
/// - Any of the structural errors raised by [`revive_snapshot`].
pub fn revive(blob: &str, bus: EventBus) -> PersistResult<ProjectManager> {
    let snapshot: ManagerSnapshot = serde_json::from_str(blob)?;
    revive_snapshot(snapshot, bus)
}

/// Rebuilds live projects and todos from a decoded snapshot.
///
/// Reconstruction is dispatched by each record's kind tag; the map is
/// rebuilt in the snapshot's project order and the default project is
/// re-linked by id.
///
/// # Errors
/// - `DeserializationError::KindMismatch` for a wrongly tagged record.
/// - `DeserializationError::ForeignTodo` when a todo's project id differs
///   from its containing project.
/// - `DeserializationError::DuplicateProject` for a repeated project id.
/// - `DeserializationError::DefaultProjectMissing` when the default id does
///   not resolve.
pub fn revive_snapshot(snapshot: ManagerSnapshot, bus: EventBus) -> PersistResult<ProjectManager> {
    if snapshot.kind != RecordKind::Manager {
        return Err(DeserializationError::KindMismatch {
            expected: RecordKind::Manager,
            found: snapshot.kind,
        });
    }

    let mut projects = IndexMap::with_capacity(snapshot.projects.len());
    for project_snapshot in snapshot.projects {
        if project_snapshot.kind != RecordKind::Project {
            return Err(DeserializationError::KindMismatch {
                expected: RecordKind::Project,
                found: project_snapshot.kind,
            });
        }
        for todo in &project_snapshot.todos {
            if todo.kind != RecordKind::Todo {
                return Err(DeserializationError::KindMismatch {
                    expected: RecordKind::Todo,
                    found: todo.kind,
                });
            }
            if todo.project_id != project_snapshot.id {
                return Err(DeserializationError::ForeignTodo {
                    todo_id: todo.id,
                    project_id: project_snapshot.id,
                });
            }
        }

        let project = Project::from_snapshot(project_snapshot);
        let id = project.id();
        if projects.insert(id, project).is_some() {
            return Err(DeserializationError::DuplicateProject(id));
        }
    }

    if !projects.contains_key(&snapshot.default_project) {
        return Err(DeserializationError::DefaultProjectMissing(
            snapshot.default_project,
        ));
    }

    Ok(ProjectManager::from_parts(
        projects,
        snapshot.default_project,
        bus,
    ))
}
