//! Command implementations for filelease.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the helpers every command shares: resolving the
//! caller identity, opening the snapshot store, and rebuilding the engine
//! from the persisted lease set.
//!
//! Mutating commands all follow the same shape:
//!
//! 1. Take the store guard (serializes against other processes)
//! 2. Load the snapshot into a [`LeaseService`]
//! 3. Run the engine operation
//! 4. Persist the new snapshot
//! 5. Append an audit event (best-effort, warns on failure)

mod acquire;
mod check;
mod events;
mod extend;
mod force_release;
mod init;
mod list;
mod purge;
mod release;
mod stats;

use crate::cli::Command;
use crate::engine::types::FileLock;
use crate::engine::LeaseService;
use crate::error::{LeaseError, Result};
use crate::events::Event;
use crate::store::Store;
use chrono::Utc;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Check(args) => check::cmd_check(args),
        Command::Acquire(args) => acquire::cmd_acquire(args),
        Command::ReleaseFeature(args) => release::cmd_release_feature(args),
        Command::Release(args) => release::cmd_release(args),
        Command::Extend(args) => extend::cmd_extend(args),
        Command::ForceRelease(args) => force_release::cmd_force_release(args),
        Command::List(args) => list::cmd_list(args),
        Command::Stats => stats::cmd_stats(),
        Command::Purge => purge::cmd_purge(),
        Command::Events(args) => events::cmd_events(args),
    }
}

/// Open the store under the current directory, requiring prior `init`.
fn require_initialized_store() -> Result<Store> {
    let store = Store::open_current()?;
    if !store.is_initialized() {
        return Err(LeaseError::UserError(format!(
            "no lease store found at '{}'.\n\n\
             Run `filelease init` to initialize one.",
            store.root().display()
        )));
    }
    Ok(store)
}

/// Get the caller identity string for lease metadata.
fn get_user_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Explicit `--user` value, or the ambient identity.
fn resolve_user(user: &Option<String>) -> String {
    user.clone().unwrap_or_else(get_user_string)
}

/// Rebuild the engine from the persisted snapshot.
fn load_service(store: &Store) -> Result<LeaseService> {
    let config = store.load_config()?;
    config.validate()?;
    let service = LeaseService::with_system_clock(config);
    service.load_snapshot(store.load_locks()?);
    Ok(service)
}

/// Persist the engine's current active lease set.
fn save_service(store: &Store, service: &LeaseService) -> Result<()> {
    store.save_locks(&service.snapshot())
}

/// Append an audit event, warning instead of failing.
///
/// A lease operation that succeeded must not be reported as failed because
/// the log could not be written.
fn log_event(store: &Store, event: Event) {
    if let Err(e) = crate::events::append_event(&store.events_path(), &event) {
        eprintln!("Warning: failed to log {} event: {}", event.action, e);
    }
}

/// Print one lease as an indented block.
fn print_lock_block(lock: &FileLock) {
    let now = Utc::now();
    println!("  {}:", lock.id);
    println!("    Project:    {}", lock.project_path);
    println!("    File:       {}", lock.file_path);
    println!("    Feature:    {}", lock.feature_id);
    println!("    Type:       {}", lock.lock_type);
    println!("    Holder:     {}", lock.locked_by);
    println!(
        "    Acquired:   {}",
        lock.acquired_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "    Expires:    {} ({})",
        lock.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        lock.remaining_string(now)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn user_string_has_host_part() {
        let user = get_user_string();
        assert!(user.contains('@'));
    }

    #[test]
    fn explicit_user_wins() {
        assert_eq!(resolve_user(&Some("alice".to_string())), "alice");
        assert!(resolve_user(&None).contains('@'));
    }

    #[test]
    #[serial]
    fn commands_fail_without_initialized_store() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        let result = require_initialized_store();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
        assert!(err.to_string().contains("filelease init"));
    }

    #[test]
    #[serial]
    fn dispatch_routes_stats_without_store() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        let result = dispatch(Command::Stats);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no lease store"));
    }
}
