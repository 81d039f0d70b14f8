//! Implementation of the `filelease events` command.

use crate::cli::EventsArgs;
use crate::error::Result;
use crate::events::read_recent_events;

/// Execute the `filelease events` command.
///
/// Prints the most recent audit log entries, oldest first.
pub fn cmd_events(args: EventsArgs) -> Result<()> {
    let store = super::require_initialized_store()?;
    let events = read_recent_events(&store.events_path(), args.tail)?;

    if events.is_empty() {
        println!("No events recorded.");
        return Ok(());
    }

    for event in &events {
        println!("{}", event);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AcquireArgs;
    use crate::commands::acquire::cmd_acquire;
    use crate::commands::init::cmd_init;
    use crate::store::Store;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn events_shows_recorded_operations() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        cmd_init().unwrap();

        cmd_acquire(AcquireArgs {
            project: "proj".to_string(),
            feature: "FEAT-001".to_string(),
            user: Some("alice".to_string()),
            shared: false,
            duration_minutes: None,
            files: vec!["src/a.rs".to_string()],
        })
        .unwrap();

        // init + acquire are both on the log
        let store = Store::open_current().unwrap();
        let events = read_recent_events(&store.events_path(), 10).unwrap();
        assert_eq!(events.len(), 2);

        cmd_events(EventsArgs { tail: 10 }).unwrap();
        cmd_events(EventsArgs { tail: 1 }).unwrap();
    }
}
