//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todos_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use todos_core::{EventBus, ProjectManager};

fn main() {
    // Why: keep a tiny CLI probe to validate core crate wiring independently
    // from any UI shell runtime setup.
    println!("todos_core ping={}", todos_core::ping());
    println!("todos_core version={}", todos_core::core_version());

    let manager = ProjectManager::new(EventBus::new());
    for entry in manager.list_projects() {
        println!(
            "project name={} count={} virtual={}",
            entry.name, entry.count, entry.is_virtual
        );
    }
}
