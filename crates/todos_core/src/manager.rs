//! Project manager aggregate root.
//!
//! # Responsibility
//! - Own every project, keyed by id in insertion order.
//! - Track which project is the default destination for new todos.
//! - Serve aggregate listings and filtered, sorted todo views.
//! - Publish a notification after every externally visible mutation.
//!
//! # Invariants
//! - The default project id always resolves to a project in the map; the
//!   default project is never removed.
//! - Commands publish only after the mutation completed; a failed command
//!   publishes nothing.
//! - Listing and flattening order is map insertion order, then todo
//!   insertion order within each project.

use crate::events::{Event, EventBus};
use crate::model::project::{Project, ProjectError, ProjectSnapshot};
use crate::model::todo::{ProjectId, ToDo, TodoDraft, TodoId, TodoSnapshot};
use crate::model::{RecordKind, ValidationError};
use crate::query::{self, SortMethod, StatusFilter, ViewState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Name of the project seeded into every fresh manager.
pub const DEFAULT_PROJECT_NAME: &str = "Todos";

/// Sentinel id of the virtual all-projects listing entry.
///
/// The nil uuid is never assigned to a real record; the presentation layer
/// treats it as "match everything", and `get_project` resolves it to the
/// default project like any other unknown id.
pub const ALL_PROJECTS_ID: ProjectId = Uuid::nil();

/// Display name of the virtual all-projects listing entry.
pub const ALL_PROJECTS_NAME: &str = "All Projects";

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Failure raised by manager commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// Field-level validation failed; state is unchanged.
    Validation(ValidationError),
    /// No project with the given id exists.
    ProjectNotFound(ProjectId),
    /// No todo with the given id exists in the resolved project.
    TodoNotFound(TodoId),
    /// The given id is the current default project, which cannot be removed.
    CannotRemoveDefault(ProjectId),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::CannotRemoveDefault(id) => {
                write!(f, "cannot remove the default project: {id}")
            }
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ManagerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ProjectError> for ManagerError {
    fn from(value: ProjectError) -> Self {
        match value {
            ProjectError::Validation(err) => Self::Validation(err),
            ProjectError::TodoNotFound(id) => Self::TodoNotFound(id),
        }
    }
}

/// One row of the project listing handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListEntry {
    pub id: ProjectId,
    pub name: String,
    /// Active-todo count; the virtual entry carries the sum over all projects.
    pub count: usize,
    /// Marks the synthesized all-projects entry, which is always listed first.
    pub is_virtual: bool,
}

/// Plain read-only copy of the whole aggregate.
///
/// This is the persisted representation: project order, todo order, counts,
/// and the default project id survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSnapshot {
    pub kind: RecordKind,
    pub projects: Vec<ProjectSnapshot>,
    pub default_project: ProjectId,
}

/// Aggregate root owning all projects and the session view state.
///
/// Constructed once per session, either fresh via [`ProjectManager::new`] or
/// revived from a persisted blob, with the session's [`EventBus`] injected.
#[derive(Debug)]
pub struct ProjectManager {
    projects: IndexMap<ProjectId, Project>,
    default_project: ProjectId,
    view: ViewState,
    bus: EventBus,
}

impl ProjectManager {
    /// Creates a manager seeded with one default project.
    pub fn new(bus: EventBus) -> Self {
        let seed = Project::new(DEFAULT_PROJECT_NAME).expect("seed project name is non-blank");
        let default_project = seed.id();
        let mut projects = IndexMap::new();
        projects.insert(default_project, seed);

        Self {
            projects,
            default_project,
            view: ViewState::default(),
            bus,
        }
    }

    /// Assembles a manager from revived parts.
    ///
    /// The caller must have verified that `default_project` is present in
    /// `projects`; revival resets the view state to its session defaults.
    pub(crate) fn from_parts(
        projects: IndexMap<ProjectId, Project>,
        default_project: ProjectId,
        bus: EventBus,
    ) -> Self {
        Self {
            projects,
            default_project,
            view: ViewState::default(),
            bus,
        }
    }

    /// Id of the current default project.
    pub fn default_project_id(&self) -> ProjectId {
        self.default_project
    }

    /// Current session view settings.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Resolves an optional project id to a project, never failing.
    ///
    /// `None`, the [`ALL_PROJECTS_ID`] sentinel, and any id not present in
    /// the map all resolve to the default project.
    pub fn get_project(&self, id: Option<ProjectId>) -> &Project {
        let target = self.resolve_project_id(id);
        self.projects
            .get(&target)
            .expect("resolved project id is present")
    }

    /// Projects in insertion order.
    pub fn projects(&self) -> impl Iterator<Item = (&ProjectId, &Project)> {
        self.projects.iter()
    }

    /// Produces the ordered project listing.
    ///
    /// The first entry is the virtual all-projects row carrying the summed
    /// count; the remaining entries follow map insertion order.
    pub fn list_projects(&self) -> Vec<ProjectListEntry> {
        let total: usize = self.projects.values().map(Project::count).sum();

        let mut entries = Vec::with_capacity(self.projects.len() + 1);
        entries.push(ProjectListEntry {
            id: ALL_PROJECTS_ID,
            name: ALL_PROJECTS_NAME.to_string(),
            count: total,
            is_virtual: true,
        });
        for project in self.projects.values() {
            entries.push(ProjectListEntry {
                id: project.id(),
                name: project.name().to_string(),
                count: project.count(),
                is_virtual: false,
            });
        }
        entries
    }

    /// Flattens every project's todos into one ordered sequence.
    pub fn all_todos(&self) -> Vec<TodoSnapshot> {
        self.projects
            .values()
            .flat_map(|project| project.todos().iter().map(ToDo::snapshot))
            .collect()
    }

    /// Filters the flattened todo sequence by status and search text.
    ///
    /// See [`query::filter_todos`] for the matching rules; order is
    /// preserved and stored todos are never mutated.
    pub fn filter_todos(&self, status: StatusFilter, search: &str) -> Vec<TodoSnapshot> {
        query::filter_todos(status, search, self.all_todos())
    }

    /// The todo sequence shown for the current view state: filtered by the
    /// session's status and search, then sorted by its sort method.
    pub fn current_view(&self) -> Vec<TodoSnapshot> {
        let filtered = self.filter_todos(self.view.status, &self.view.search);
        query::sort_todos(self.view.sort, filtered)
    }

    /// Plain read-only copy of the whole aggregate.
    pub fn snapshot(&self) -> ManagerSnapshot {
        ManagerSnapshot {
            kind: RecordKind::Manager,
            projects: self.projects.values().map(Project::snapshot).collect(),
            default_project: self.default_project,
        }
    }

    /// Creates a project and inserts it keyed by its fresh id.
    ///
    /// The new project is not auto-selected as default.
    ///
    /// # Errors
    /// - `ManagerError::Validation` when the name is blank.
    pub fn add_project(&mut self, name: impl Into<String>) -> ManagerResult<ProjectId> {
        let project = Project::new(name)?;
        let id = project.id();
        self.projects.insert(id, project);

        self.publish_project_list();
        self.publish_state();
        Ok(id)
    }

    /// Removes the project with the given id.
    ///
    /// # Errors
    /// - `ManagerError::ProjectNotFound` when the id is absent.
    /// - `ManagerError::CannotRemoveDefault` when the id is the current
    ///   default project; reassign the default first.
    pub fn delete_project(&mut self, id: ProjectId) -> ManagerResult<()> {
        if !self.projects.contains_key(&id) {
            return Err(ManagerError::ProjectNotFound(id));
        }
        if id == self.default_project {
            return Err(ManagerError::CannotRemoveDefault(id));
        }
        self.projects.shift_remove(&id);

        self.publish_todos();
        self.publish_project_list();
        self.publish_state();
        Ok(())
    }

    /// Renames the project resolved through [`ProjectManager::get_project`]
    /// semantics, so a `None` or unknown id renames the default project.
    ///
    /// # Errors
    /// - `ManagerError::Validation` when the new name is blank.
    pub fn rename_project(
        &mut self,
        id: Option<ProjectId>,
        name: impl Into<String>,
    ) -> ManagerResult<()> {
        let target = self.resolve_project_id(id);
        let project = self
            .projects
            .get_mut(&target)
            .expect("resolved project id is present");
        project.rename(name)?;

        self.publish_project_list();
        self.publish_state();
        Ok(())
    }

    /// Reassigns the default project.
    ///
    /// # Errors
    /// - `ManagerError::ProjectNotFound` when the id is absent; the previous
    ///   default stays in place.
    pub fn set_default_project(&mut self, id: ProjectId) -> ManagerResult<()> {
        if !self.projects.contains_key(&id) {
            return Err(ManagerError::ProjectNotFound(id));
        }
        self.default_project = id;

        self.publish_project_list();
        self.publish_state();
        Ok(())
    }

    /// Creates a todo from draft fields in the resolved project.
    ///
    /// `project_id` resolves through [`ProjectManager::get_project`]
    /// semantics, so `None` and the all-projects sentinel route to the
    /// default project.
    ///
    /// # Errors
    /// - `ManagerError::Validation` when the draft title is blank or its
    ///   priority is outside the canonical set.
    pub fn add_todo(
        &mut self,
        project_id: Option<ProjectId>,
        draft: TodoDraft,
    ) -> ManagerResult<TodoId> {
        let target = self.resolve_project_id(project_id);
        let todo = ToDo::new(target, draft)?;
        let todo_id = todo.id();
        self.projects
            .get_mut(&target)
            .expect("resolved project id is present")
            .add(todo);

        self.publish_todos();
        self.publish_project_list();
        self.publish_state();
        Ok(todo_id)
    }

    /// Applies a full draft to an existing todo in the resolved project.
    ///
    /// # Errors
    /// - `ManagerError::TodoNotFound` when `todo_id` is absent there.
    /// - `ManagerError::Validation` when the draft fails field validation;
    ///   the todo is left unchanged.
    pub fn edit_todo(
        &mut self,
        project_id: Option<ProjectId>,
        todo_id: TodoId,
        draft: TodoDraft,
    ) -> ManagerResult<()> {
        let target = self.resolve_project_id(project_id);
        self.projects
            .get_mut(&target)
            .expect("resolved project id is present")
            .edit_todo(todo_id, draft)?;

        self.publish_todos();
        self.publish_state();
        Ok(())
    }

    /// Removes a todo from the resolved project.
    ///
    /// # Errors
    /// - `ManagerError::TodoNotFound` when `todo_id` is absent there.
    pub fn delete_todo(
        &mut self,
        project_id: Option<ProjectId>,
        todo_id: TodoId,
    ) -> ManagerResult<()> {
        let target = self.resolve_project_id(project_id);
        self.projects
            .get_mut(&target)
            .expect("resolved project id is present")
            .remove(todo_id)?;

        self.publish_todos();
        self.publish_project_list();
        self.publish_state();
        Ok(())
    }

    /// Toggles the completion flag of a todo in the resolved project.
    ///
    /// # Errors
    /// - `ManagerError::TodoNotFound` when `todo_id` is absent there.
    pub fn toggle_todo(
        &mut self,
        project_id: Option<ProjectId>,
        todo_id: TodoId,
    ) -> ManagerResult<()> {
        let target = self.resolve_project_id(project_id);
        self.projects
            .get_mut(&target)
            .expect("resolved project id is present")
            .toggle_complete(todo_id)?;

        self.publish_todos();
        self.publish_project_list();
        self.publish_state();
        Ok(())
    }

    /// Replaces the session view settings and republishes the todo view.
    ///
    /// View settings are session state, not persisted state, so only the
    /// todo view notification fires.
    pub fn change_filter(
        &mut self,
        status: StatusFilter,
        sort: SortMethod,
        search: impl Into<String>,
    ) {
        self.view = ViewState {
            status,
            sort,
            search: search.into(),
        };
        self.publish_todos();
    }

    fn resolve_project_id(&self, id: Option<ProjectId>) -> ProjectId {
        match id {
            Some(id) if self.projects.contains_key(&id) => id,
            _ => self.default_project,
        }
    }

    fn publish_todos(&self) {
        self.bus.publish(&Event::TodosUpdated(self.current_view()));
    }

    fn publish_project_list(&self) {
        self.bus
            .publish(&Event::ProjectListChanged(self.list_projects()));
    }

    fn publish_state(&self) {
        self.bus.publish(&Event::StateChanged(self.snapshot()));
    }
}
