use rusqlite::Connection;
use std::rc::Rc;
use todos_core::store::latest_version;
use todos_core::{
    bind_store, load_or_seed, open_store, open_store_in_memory, revive, EventBus, EventKind,
    ProjectManager, StoreError, TodoDraft, DEFAULT_PROJECT_NAME,
};

#[test]
fn in_memory_store_saves_and_loads_the_blob() {
    let store = open_store_in_memory().unwrap();

    assert_eq!(store.load_blob().unwrap(), None);

    store.save_blob("first").unwrap();
    assert_eq!(store.load_blob().unwrap().as_deref(), Some("first"));

    store.save_blob("second").unwrap();
    assert_eq!(store.load_blob().unwrap().as_deref(), Some("second"));
}

#[test]
fn open_store_applies_all_migrations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.db");

    let store = open_store(&path).unwrap();
    drop(store);

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "state_blobs");
}

#[test]
fn reopening_the_same_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.db");

    let first = open_store(&path).unwrap();
    first.save_blob("kept").unwrap();
    drop(first);

    let second = open_store(&path).unwrap();
    assert_eq!(second.load_blob().unwrap().as_deref(), Some("kept"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_store(&path).unwrap_err();
    match err {
        StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bound_store_saves_after_every_state_change() {
    let bus = EventBus::new();
    let store = Rc::new(open_store_in_memory().unwrap());
    bind_store(Rc::clone(&store), &bus);
    let mut manager = ProjectManager::new(bus);

    manager.add_todo(None, TodoDraft::titled("persist me")).unwrap();
    let blob = store.load_blob().unwrap().unwrap();
    let revived = revive(&blob, EventBus::new()).unwrap();
    assert_eq!(revived.all_todos().len(), 1);
    assert_eq!(revived.all_todos()[0].title, "persist me");

    let todo_id = manager.all_todos()[0].id;
    manager.toggle_todo(None, todo_id).unwrap();
    let blob = store.load_blob().unwrap().unwrap();
    let revived = revive(&blob, EventBus::new()).unwrap();
    assert!(revived.all_todos()[0].complete);
}

#[test]
fn unsubscribing_the_store_stops_saving() {
    let bus = EventBus::new();
    let store = Rc::new(open_store_in_memory().unwrap());
    let subscription = bind_store(Rc::clone(&store), &bus);
    let mut manager = ProjectManager::new(bus.clone());

    manager.add_project("Work").unwrap();
    assert!(store.load_blob().unwrap().is_some());

    assert!(bus.unsubscribe(EventKind::StateChanged, subscription));
    manager.add_project("Unsaved").unwrap();

    let blob = store.load_blob().unwrap().unwrap();
    let revived = revive(&blob, EventBus::new()).unwrap();
    let entries = revived.list_projects();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| entry.name != "Unsaved"));
}

#[test]
fn seeding_writes_nothing_until_the_first_command() {
    let bus = EventBus::new();
    let store = Rc::new(open_store_in_memory().unwrap());
    bind_store(Rc::clone(&store), &bus);

    let mut manager = load_or_seed(&store, &bus);
    assert!(store.load_blob().unwrap().is_none());

    manager.add_project("First write").unwrap();
    assert!(store.load_blob().unwrap().is_some());
}

#[test]
fn load_or_seed_revives_the_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.db");

    let first_bus = EventBus::new();
    let first_store = Rc::new(open_store(&path).unwrap());
    bind_store(Rc::clone(&first_store), &first_bus);
    let mut manager = load_or_seed(&first_store, &first_bus);
    assert_eq!(manager.list_projects().len(), 2);

    let work = manager.add_project("Work").unwrap();
    manager
        .add_todo(Some(work), TodoDraft::titled("carry over"))
        .unwrap();
    manager.set_default_project(work).unwrap();
    drop(manager);
    drop(first_store);

    let second_bus = EventBus::new();
    let second_store = Rc::new(open_store(&path).unwrap());
    let revived = load_or_seed(&second_store, &second_bus);

    assert_eq!(revived.default_project_id(), work);
    let entries = revived.list_projects();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].name, "Work");
    let todos = revived.all_todos();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "carry over");
}

#[test]
fn load_or_seed_falls_back_to_a_fresh_seed_on_corrupt_blob() {
    let store = open_store_in_memory().unwrap();
    store.save_blob("{ this is not the persisted shape").unwrap();

    let manager = load_or_seed(&store, &EventBus::new());

    let entries = manager.list_projects();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].name, DEFAULT_PROJECT_NAME);
    assert!(manager.all_todos().is_empty());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
