//! Implementation of the `filelease acquire` command.
//!
//! Acquires leases on every requested file for a feature, all-or-nothing.
//! On conflict the blocking holders are printed per file and the command
//! exits with the conflict code, leaving the store untouched.

use crate::cli::AcquireArgs;
use crate::engine::types::LockType;
use crate::engine::AcquireRequest;
use crate::error::{LeaseError, Result};
use crate::events::{Event, EventAction};
use serde_json::json;

/// Execute the `filelease acquire` command.
pub fn cmd_acquire(args: AcquireArgs) -> Result<()> {
    let store = super::require_initialized_store()?;
    let user = super::resolve_user(&args.user);
    let _guard = store.lock(&user, "acquire")?;

    let service = super::load_service(&store)?;

    let lock_type = if args.shared {
        LockType::Shared
    } else {
        LockType::Exclusive
    };

    let request = AcquireRequest {
        project_path: args.project.clone(),
        feature_id: args.feature.clone(),
        user_id: user.clone(),
        files: args.files.clone(),
        lock_type,
        duration_minutes: args.duration_minutes,
    };

    let locks = match service.acquire(&request) {
        Ok(locks) => locks,
        Err(LeaseError::Conflict(conflicts)) => {
            eprintln!("Cannot acquire: {} file(s) are locked by other features.", conflicts.len());
            eprintln!();
            for conflict in &conflicts {
                eprintln!(
                    "  {}  held by {} ({}, {} lock, expires {})",
                    conflict.file_path,
                    conflict.feature_id,
                    conflict.locked_by,
                    conflict.lock_type,
                    conflict.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            eprintln!();
            eprintln!("Wait for the holders to release or expire, or check again with `filelease check`.");
            return Err(LeaseError::Conflict(conflicts));
        }
        Err(e) => return Err(e),
    };

    super::save_service(&store, &service)?;

    let event = Event::new(EventAction::Acquire, &user)
        .with_feature(&args.feature)
        .with_details(json!({
            "project": args.project,
            "lock_type": lock_type.as_str(),
            "files": locks.iter().map(|l| l.file_path.clone()).collect::<Vec<_>>(),
            "lock_ids": locks.iter().map(|l| l.id.clone()).collect::<Vec<_>>(),
            "expires_at": locks.first().map(|l| l.expires_at.to_rfc3339()),
        }));
    super::log_event(&store, event);

    println!(
        "Acquired {} {} lease(s) for {}:",
        locks.len(),
        lock_type,
        args.feature
    );
    println!();
    for lock in &locks {
        super::print_lock_block(lock);
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::cmd_init;
    use crate::store::Store;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    fn acquire_args(feature: &str, user: &str, files: &[&str]) -> AcquireArgs {
        AcquireArgs {
            project: "proj".to_string(),
            feature: feature.to_string(),
            user: Some(user.to_string()),
            shared: false,
            duration_minutes: None,
            files: files.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    #[serial]
    fn acquire_persists_leases() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        cmd_init().unwrap();

        cmd_acquire(acquire_args("FEAT-001", "alice", &["src/a.rs", "src/b.rs"])).unwrap();

        let store = Store::open_current().unwrap();
        let locks = store.load_locks().unwrap();
        assert_eq!(locks.len(), 2);
        assert!(locks.iter().all(|l| l.feature_id == "FEAT-001"));
        assert!(locks.iter().all(|l| l.locked_by == "alice"));

        // guard file is released after the command
        assert!(!store.guard_path().exists());
    }

    #[test]
    #[serial]
    fn conflicting_acquire_exits_with_conflict_and_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        cmd_init().unwrap();

        cmd_acquire(acquire_args("FEAT-001", "alice", &["src/a.rs"])).unwrap();

        let result = cmd_acquire(acquire_args("FEAT-002", "bob", &["src/a.rs", "src/b.rs"]));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().exit_code(), crate::exit_codes::CONFLICT);

        // all-or-nothing: the free file was not leased either
        let store = Store::open_current().unwrap();
        let locks = store.load_locks().unwrap();
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0].feature_id, "FEAT-001");
    }

    #[test]
    #[serial]
    fn shared_acquires_coexist() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        cmd_init().unwrap();

        let mut first = acquire_args("FEAT-001", "alice", &["docs/api.md"]);
        first.shared = true;
        cmd_acquire(first).unwrap();

        let mut second = acquire_args("FEAT-002", "bob", &["docs/api.md"]);
        second.shared = true;
        cmd_acquire(second).unwrap();

        let store = Store::open_current().unwrap();
        assert_eq!(store.load_locks().unwrap().len(), 2);
    }

    #[test]
    #[serial]
    fn out_of_range_duration_is_a_validation_failure() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        cmd_init().unwrap();

        let mut args = acquire_args("FEAT-001", "alice", &["src/a.rs"]);
        args.duration_minutes = Some(0);
        let result = cmd_acquire(args);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().exit_code(),
            crate::exit_codes::VALIDATION_FAILURE
        );
    }
}
