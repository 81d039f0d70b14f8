//! Implementation of the `filelease list` command.

use crate::cli::ListArgs;
use crate::error::Result;

/// Execute the `filelease list` command.
///
/// Lists active leases, optionally narrowed by project and/or feature.
/// Expired leases never appear. Read-only, so no store guard is taken.
pub fn cmd_list(args: ListArgs) -> Result<()> {
    let store = super::require_initialized_store()?;
    let service = super::load_service(&store)?;

    let locks: Vec<_> = service
        .all_locks()
        .into_iter()
        .filter(|l| {
            args.project
                .as_deref()
                .is_none_or(|p| l.project_path == p)
        })
        .filter(|l| args.feature.as_deref().is_none_or(|f| l.feature_id == f))
        .collect();

    if locks.is_empty() {
        println!("No active leases.");
        return Ok(());
    }

    println!("Active leases ({}):", locks.len());
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
    use crate::cli::AcquireArgs;
    use crate::commands::acquire::cmd_acquire;
    use crate::commands::init::cmd_init;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    fn acquire(project: &str, feature: &str, file: &str) {
        cmd_acquire(AcquireArgs {
            project: project.to_string(),
            feature: feature.to_string(),
            user: Some("alice".to_string()),
            shared: false,
            duration_minutes: None,
            files: vec![file.to_string()],
        })
        .unwrap();
    }

    #[test]
    #[serial]
    fn list_handles_empty_and_filtered_views() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        cmd_init().unwrap();

        // empty store
        cmd_list(ListArgs {
            project: None,
            feature: None,
        })
        .unwrap();

        acquire("proj-a", "FEAT-001", "src/a.rs");
        acquire("proj-b", "FEAT-002", "src/b.rs");

        // unfiltered, by project, by feature, and combined
        cmd_list(ListArgs {
            project: None,
            feature: None,
        })
        .unwrap();
        cmd_list(ListArgs {
            project: Some("proj-a".to_string()),
            feature: None,
        })
        .unwrap();
        cmd_list(ListArgs {
            project: Some("proj-a".to_string()),
            feature: Some("FEAT-002".to_string()),
        })
        .unwrap();
    }
}
