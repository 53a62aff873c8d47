//! Core domain logic for the todos tracker.
//! This crate is the single source of truth for business invariants.

pub mod events;
pub mod logging;
pub mod manager;
pub mod model;
pub mod persist;
pub mod query;
pub mod store;

pub use events::{Event, EventBus, EventKind, SubscriptionId};
pub use logging::{default_log_level, init_logging, logging_status};
pub use manager::{
    ManagerError, ManagerResult, ManagerSnapshot, ProjectListEntry, ProjectManager,
    ALL_PROJECTS_ID, ALL_PROJECTS_NAME, DEFAULT_PROJECT_NAME,
};
pub use model::project::{Project, ProjectError, ProjectResult, ProjectSnapshot};
pub use model::todo::{Priority, ProjectId, ToDo, TodoDraft, TodoId, TodoSnapshot, TodoStatus};
pub use model::{RecordKind, ValidationError, ValidationResult};
pub use persist::{encode, revive, revive_snapshot, serialize, DeserializationError, PersistResult};
pub use query::{filter_todos, sort_todos, SortMethod, StatusFilter, ViewState};
pub use store::{
    bind_store, load_or_seed, open_store, open_store_in_memory, Store, StoreError, StoreResult,
    STATE_BLOB_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
