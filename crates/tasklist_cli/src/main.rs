//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tasklist_core` linkage outside the Flutter/FFI runtime.
//! - Print summary counts for the configured store.

use std::process::ExitCode;
use tasklist_core::db::open_db;
use tasklist_core::{init_logging, CoreConfig, SqliteKeyValueStore, TaskStore};

fn main() -> ExitCode {
    println!("tasklist_core ping={}", tasklist_core::ping());
    println!("tasklist_core version={}", tasklist_core::core_version());

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    let conn = match open_db(&config.store_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("store open failed at {}: {err}", config.store_path.display());
            return ExitCode::FAILURE;
        }
    };

    let store = TaskStore::open(SqliteKeyValueStore::new(&conn));
    let stats = store.stats();
    println!("store={}", config.store_path.display());
    println!(
        "tasks total={} completed={} pending={} overdue={}",
        stats.total, stats.completed, stats.pending, stats.overdue
    );
    ExitCode::SUCCESS
}
