//! SQLite-backed blob store collaborator.
//!
//! # Responsibility
//! - Persist the serialized aggregate under one well-known key.
//! - Bind saving to state-change notifications.
//! - Revive stored state at startup, falling back to a fresh seeded manager
//!   when the stored blob cannot be used.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`; a database newer
//!   than this binary is rejected, never migrated downward.
//! - Save failures inside the notification handler are logged and never
//!   propagate into the publishing command.

use crate::events::{Event, EventBus, EventKind, SubscriptionId};
use crate::manager::ProjectManager;
use crate::persist;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Key the aggregate blob is stored under.
pub const STATE_BLOB_KEY: &str = "projects_data";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by store bootstrap and blob access.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: "CREATE TABLE state_blobs (
        key TEXT PRIMARY KEY NOT NULL,
        blob TEXT NOT NULL,
        updated_at_ms INTEGER NOT NULL
    );",
}];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Key-value blob store over one SQLite connection.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Writes the aggregate blob, replacing any previous value.
    pub fn save_blob(&self, blob: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO state_blobs (key, blob, updated_at_ms)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                blob = excluded.blob,
                updated_at_ms = excluded.updated_at_ms;",
            params![STATE_BLOB_KEY, blob],
        )?;
        Ok(())
    }

    /// Reads the aggregate blob, if one has been saved.
    pub fn load_blob(&self) -> StoreResult<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT blob FROM state_blobs WHERE key = ?1;",
                [STATE_BLOB_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob)
    }
}

/// Opens a store database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> StoreResult<Store> {
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory store and applies all pending migrations.
pub fn open_store_in_memory() -> StoreResult<Store> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Store> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode={mode}");

    let result = open().map_err(StoreError::from).and_then(|mut conn| {
        bootstrap_connection(&mut conn)?;
        Ok(conn)
    });

    match result {
        Ok(conn) => {
            info!(
                "event=store_open module=store status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(Store { conn })
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }
    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> StoreResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Subscribes the store to state-change notifications.
///
/// Every published snapshot is encoded and written under
/// [`STATE_BLOB_KEY`]. Encode or save failures are logged and swallowed so
/// the publishing command never observes a persistence error.
pub fn bind_store(store: Rc<Store>, bus: &EventBus) -> SubscriptionId {
    bus.subscribe(EventKind::StateChanged, move |event| {
        let Event::StateChanged(snapshot) = event else {
            return;
        };
        let blob = match persist::encode(snapshot) {
            Ok(blob) => blob,
            Err(err) => {
                error!(
                    "event=state_save module=store status=error error_code=encode_failed error={err}"
                );
                return;
            }
        };
        if let Err(err) = store.save_blob(&blob) {
            error!(
                "event=state_save module=store status=error error_code=save_failed error={err}"
            );
        }
    })
}

/// Revives the stored aggregate, or seeds a fresh manager.
///
/// A missing blob seeds silently; a load or revive failure is logged as a
/// warning and also falls back to a fresh seeded manager, so a broken blob
/// never prevents the session from starting.
pub fn load_or_seed(store: &Store, bus: &EventBus) -> ProjectManager {
    match store.load_blob() {
        Ok(Some(blob)) => match persist::revive(&blob, bus.clone()) {
            Ok(manager) => {
                info!(
                    "event=state_load module=store status=ok source=blob projects={}",
                    manager.projects().count()
                );
                manager
            }
            Err(err) => {
                warn!(
                    "event=state_load module=store status=error error_code=revive_failed fallback=seed error={err}"
                );
                ProjectManager::new(bus.clone())
            }
        },
        Ok(None) => {
            info!("event=state_load module=store status=ok source=seed");
            ProjectManager::new(bus.clone())
        }
        Err(err) => {
            warn!(
                "event=state_load module=store status=error error_code=load_failed fallback=seed error={err}"
            );
            ProjectManager::new(bus.clone())
        }
    }
}
