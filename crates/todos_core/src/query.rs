//! Filtering and sorting over todo snapshots.
//!
//! # Responsibility
//! - Narrow a todo sequence by completion status and search text.
//! - Order a todo sequence by due date, title, or creation time.
//!
//! # Invariants
//! - Filtering and sorting operate on snapshots and never touch stored todos.
//! - Every ordering is stable for keys beyond its stated tie-breaks.

use crate::model::todo::{TodoSnapshot, TodoStatus};
use std::cmp::Ordering;

/// Completion-status filter applied to todo listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Keep every todo.
    All,
    /// Keep todos whose completion flag is set.
    Complete,
    /// Keep todos whose completion flag is unset.
    Active,
}

impl StatusFilter {
    /// Whether a todo with the given derived status passes this filter.
    pub fn matches(self, status: TodoStatus) -> bool {
        match self {
            Self::All => true,
            Self::Complete => status == TodoStatus::Complete,
            Self::Active => status == TodoStatus::Active,
        }
    }
}

/// Ordering applied to todo listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMethod {
    /// Ascending by due date; ties broken by priority, highest first.
    /// Todos without a due date sort after every dated todo.
    Due,
    /// Ascending by title, case-insensitive.
    Name,
    /// Ascending by creation timestamp.
    Created,
}

/// Per-session view settings held by the manager.
///
/// The initial view shows active todos sorted by due date with no search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub status: StatusFilter,
    pub sort: SortMethod,
    pub search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: StatusFilter::Active,
            sort: SortMethod::Due,
            search: String::new(),
        }
    }
}

/// Keeps todos that match the status filter and contain the search text.
///
/// A non-empty `search` keeps todos whose title, description, or notes
/// contain it as a case-sensitive substring; an empty `search` keeps
/// everything. Input order is preserved.
pub fn filter_todos(
    status: StatusFilter,
    search: &str,
    todos: Vec<TodoSnapshot>,
) -> Vec<TodoSnapshot> {
    todos
        .into_iter()
        .filter(|todo| status.matches(todo.status()) && matches_search(search, todo))
        .collect()
}

/// Sorts todos by the given method and returns the reordered sequence.
///
/// Uses a stable sort, so inputs equal under the method's keys keep their
/// relative order.
pub fn sort_todos(method: SortMethod, mut todos: Vec<TodoSnapshot>) -> Vec<TodoSnapshot> {
    match method {
        SortMethod::Due => todos.sort_by(compare_due),
        SortMethod::Name => {
            todos.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
        SortMethod::Created => todos.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms)),
    }
    todos
}

fn matches_search(search: &str, todo: &TodoSnapshot) -> bool {
    if search.is_empty() {
        return true;
    }
    todo.title.contains(search)
        || todo.description.contains(search)
        || todo.notes.contains(search)
}

fn compare_due(a: &TodoSnapshot, b: &TodoSnapshot) -> Ordering {
    // ISO `YYYY-MM-DD` dates compare correctly as strings.
    match (a.due_date.as_deref(), b.due_date.as_deref()) {
        (Some(a_due), Some(b_due)) => a_due
            .cmp(b_due)
            .then_with(|| b.priority.cmp(&a.priority)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.priority.cmp(&a.priority),
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_todos, sort_todos, SortMethod, StatusFilter};
    use crate::model::todo::{Priority, TodoSnapshot};
    use crate::model::RecordKind;
    use uuid::Uuid;

    fn snapshot(title: &str, due: Option<&str>, priority: Priority) -> TodoSnapshot {
        TodoSnapshot {
            kind: RecordKind::Todo,
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            due_date: due.map(str::to_string),
            priority,
            notes: String::new(),
            complete: false,
            created_at_ms: 0,
        }
    }

    #[test]
    fn empty_search_keeps_every_todo() {
        let todos = vec![snapshot("a", None, Priority::None)];
        let kept = filter_todos(StatusFilter::All, "", todos.clone());
        assert_eq!(kept, todos);
    }

    #[test]
    fn undated_todos_sort_after_dated_todos() {
        let todos = vec![
            snapshot("floating", None, Priority::High),
            snapshot("dated", Some("2026-01-15"), Priority::None),
        ];
        let sorted = sort_todos(SortMethod::Due, todos);
        assert_eq!(sorted[0].title, "dated");
        assert_eq!(sorted[1].title, "floating");
    }

    #[test]
    fn search_is_case_sensitive() {
        let todos = vec![snapshot("Buy milk", None, Priority::None)];
        assert_eq!(filter_todos(StatusFilter::All, "Buy", todos.clone()).len(), 1);
        assert!(filter_todos(StatusFilter::All, "buy", todos).is_empty());
    }
}
