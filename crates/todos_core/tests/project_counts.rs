use todos_core::{
    Priority, Project, ProjectError, ProjectSnapshot, RecordKind, ToDo, TodoDraft, ValidationError,
};
use uuid::Uuid;

#[test]
fn new_project_starts_empty() {
    let project = Project::new("  Work  ").unwrap();

    assert!(!project.id().is_nil());
    assert_eq!(project.name(), "Work");
    assert_eq!(project.count(), 0);
    assert!(project.todos().is_empty());
}

#[test]
fn blank_project_name_is_rejected() {
    let err = Project::new("   ").unwrap_err();
    assert_eq!(err, ValidationError::EmptyProjectName);
}

#[test]
fn add_increments_count_per_todo() {
    let mut project = Project::new("Work").unwrap();

    project.add(make_todo(&project, "first"));
    project.add(make_todo(&project, "second"));

    assert_eq!(project.count(), 2);
    assert_eq!(project.todos().len(), 2);
}

#[test]
fn add_counts_an_already_complete_todo_too() {
    let mut project = Project::new("Work").unwrap();
    let mut todo = make_todo(&project, "done before it arrived");
    todo.toggle_complete();

    project.add(todo);

    // The increment is unconditional, so the count over-reports here.
    assert_eq!(project.count(), 1);
}

#[test]
fn remove_active_todo_decrements_count() {
    let mut project = Project::new("Work").unwrap();
    project.add(make_todo(&project, "keep"));
    let target = make_todo(&project, "drop");
    let target_id = target.id();
    project.add(target);

    let removed = project.remove(target_id).unwrap();

    assert_eq!(removed.id(), target_id);
    assert_eq!(removed.title(), "drop");
    assert_eq!(project.count(), 1);
    assert_eq!(project.todos().len(), 1);
}

#[test]
fn remove_complete_todo_keeps_count() {
    let mut project = Project::new("Work").unwrap();
    let todo = make_todo(&project, "finished");
    let id = todo.id();
    project.add(todo);
    project.toggle_complete(id).unwrap();
    assert_eq!(project.count(), 0);

    project.remove(id).unwrap();

    assert_eq!(project.count(), 0);
    assert!(project.todos().is_empty());
}

#[test]
fn remove_unknown_todo_fails_and_changes_nothing() {
    let mut project = Project::new("Work").unwrap();
    project.add(make_todo(&project, "only"));
    let missing = Uuid::new_v4();

    let err = project.remove(missing).unwrap_err();

    assert_eq!(err, ProjectError::TodoNotFound(missing));
    assert_eq!(project.count(), 1);
    assert_eq!(project.todos().len(), 1);
}

#[test]
fn toggle_adjusts_count_both_ways() {
    let mut project = Project::new("Work").unwrap();
    let todo = make_todo(&project, "flip");
    let id = todo.id();
    project.add(todo);
    assert_eq!(project.count(), 1);

    project.toggle_complete(id).unwrap();
    assert_eq!(project.count(), 0);
    assert!(project.get_todo(id).unwrap().complete());

    project.toggle_complete(id).unwrap();
    assert_eq!(project.count(), 1);
    assert!(!project.get_todo(id).unwrap().complete());
}

#[test]
fn toggle_unknown_todo_fails_and_changes_nothing() {
    let mut project = Project::new("Work").unwrap();
    project.add(make_todo(&project, "only"));

    let missing = Uuid::new_v4();
    let err = project.toggle_complete(missing).unwrap_err();

    assert_eq!(err, ProjectError::TodoNotFound(missing));
    assert_eq!(project.count(), 1);
}

#[test]
fn edit_todo_never_moves_the_count() {
    let mut project = Project::new("Work").unwrap();
    let todo = make_todo(&project, "draft");
    let id = todo.id();
    project.add(todo);

    let mut good = TodoDraft::titled("polished");
    good.priority = "high".to_string();
    project.edit_todo(id, good).unwrap();
    assert_eq!(project.count(), 1);
    assert_eq!(project.get_todo(id).unwrap().title(), "polished");
    assert_eq!(project.get_todo(id).unwrap().priority(), Priority::High);

    let err = project.edit_todo(id, TodoDraft::titled("  ")).unwrap_err();
    assert_eq!(err, ProjectError::Validation(ValidationError::EmptyTitle));
    assert_eq!(project.count(), 1);
    assert_eq!(project.get_todo(id).unwrap().title(), "polished");
}

#[test]
fn edit_unknown_todo_reports_not_found() {
    let mut project = Project::new("Work").unwrap();
    let missing = Uuid::new_v4();

    let err = project
        .edit_todo(missing, TodoDraft::titled("anything"))
        .unwrap_err();

    assert_eq!(err, ProjectError::TodoNotFound(missing));
}

#[test]
fn rename_trims_and_validates() {
    let mut project = Project::new("Work").unwrap();

    project.rename(" Personal ").unwrap();
    assert_eq!(project.name(), "Personal");

    let err = project.rename("").unwrap_err();
    assert_eq!(err, ValidationError::EmptyProjectName);
    assert_eq!(project.name(), "Personal");
}

#[test]
fn revived_count_is_preserved_verbatim() {
    let project = Project::new("Drifted").unwrap();
    let todo = make_todo(&project, "lone survivor");
    let todo_id = todo.id();
    let snapshot = ProjectSnapshot {
        kind: RecordKind::Project,
        id: project.id(),
        name: "Drifted".to_string(),
        count: 5,
        todos: vec![todo.snapshot()],
    };

    let mut revived = Project::from_snapshot(snapshot);
    assert_eq!(revived.count(), 5);

    // Later mutations adjust from the restored value instead of recomputing.
    revived.remove(todo_id).unwrap();
    assert_eq!(revived.count(), 4);
}

#[test]
fn removals_never_underflow_a_drifted_count() {
    let project = Project::new("Tampered").unwrap();
    let todo = make_todo(&project, "active but uncounted");
    let todo_id = todo.id();
    let snapshot = ProjectSnapshot {
        kind: RecordKind::Project,
        id: project.id(),
        name: "Tampered".to_string(),
        count: 0,
        todos: vec![todo.snapshot()],
    };

    let mut revived = Project::from_snapshot(snapshot);
    revived.remove(todo_id).unwrap();

    assert_eq!(revived.count(), 0);
}

fn make_todo(project: &Project, title: &str) -> ToDo {
    ToDo::new(project.id(), TodoDraft::titled(title)).unwrap()
}
