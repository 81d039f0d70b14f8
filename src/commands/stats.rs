//! Implementation of the `filelease stats` command.

use crate::error::Result;

/// Execute the `filelease stats` command.
///
/// Prints active-lease counts overall, by project, and by user. Expired
/// leases are not counted. Read-only, so no store guard is taken.
pub fn cmd_stats() -> Result<()> {
    let store = super::require_initialized_store()?;
    let service = super::load_service(&store)?;
    let stats = service.stats();

    println!("Active leases: {}", stats.total_active);

    if stats.total_active == 0 {
        return Ok(());
    }

    println!();
    println!("By project:");
    for (project, count) in &stats.by_project {
        println!("  {:<40} {}", project, count);
    }

    println!();
    println!("By user:");
    for (user, count) in &stats.by_user {
        println!("  {:<40} {}", user, count);
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

    #[test]
    #[serial]
    fn stats_runs_on_empty_and_populated_store() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        cmd_init().unwrap();

        cmd_stats().unwrap();

        cmd_acquire(AcquireArgs {
            project: "proj".to_string(),
            feature: "FEAT-001".to_string(),
            user: Some("alice".to_string()),
            shared: false,
            duration_minutes: None,
            files: vec!["src/a.rs".to_string(), "src/b.rs".to_string()],
        })
        .unwrap();

        cmd_stats().unwrap();
    }
}
