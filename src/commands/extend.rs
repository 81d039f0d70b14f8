//! Implementation of the `filelease extend` command.

use crate::cli::ExtendArgs;
use crate::error::Result;
use crate::events::{Event, EventAction};
use chrono::Utc;
use serde_json::json;

/// Execute the `filelease extend` command.
///
/// Pushes the expiry of one lease forward. The caller identity must match
/// the holder, and an expired lease cannot be extended back to life.
pub fn cmd_extend(args: ExtendArgs) -> Result<()> {
    let store = super::require_initialized_store()?;
    let user = super::resolve_user(&args.user);
    let _guard = store.lock(&user, "extend")?;

    let service = super::load_service(&store)?;
    let extended = service.extend_lock(&args.lock_id, &user, args.minutes)?;
    super::save_service(&store, &service)?;

    let event = Event::new(EventAction::Extend, &user)
        .with_feature(&extended.feature_id)
        .with_details(json!({
            "lock_id": extended.id,
            "minutes": args.minutes,
            "expires_at": extended.expires_at.to_rfc3339(),
        }));
    super::log_event(&store, event);

    println!(
        "Extended {} by {} minute(s); now expires {} ({}).",
        extended.id,
        args.minutes,
        extended.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        extended.remaining_string(Utc::now())
    );

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

    fn setup_with_lease() -> String {
        cmd_init().unwrap();
        cmd_acquire(AcquireArgs {
            project: "proj".to_string(),
            feature: "FEAT-001".to_string(),
            user: Some("alice".to_string()),
            shared: false,
            duration_minutes: Some(30),
            files: vec!["src/a.rs".to_string()],
        })
        .unwrap();

        let store = Store::open_current().unwrap();
        store.load_locks().unwrap()[0].id.clone()
    }

    #[test]
    #[serial]
    fn extend_pushes_expiry_forward() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        let lock_id = setup_with_lease();

        let store = Store::open_current().unwrap();
        let before = store.load_locks().unwrap()[0].expires_at;

        cmd_extend(ExtendArgs {
            lock_id,
            minutes: 45,
            user: Some("alice".to_string()),
        })
        .unwrap();

        let after = store.load_locks().unwrap()[0].expires_at;
        assert_eq!(after - before, chrono::Duration::minutes(45));
    }

    #[test]
    #[serial]
    fn extend_by_non_owner_is_denied() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        let lock_id = setup_with_lease();

        let result = cmd_extend(ExtendArgs {
            lock_id,
            minutes: 45,
            user: Some("mallory".to_string()),
        });
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().exit_code(), crate::exit_codes::DENIED);
    }

    #[test]
    #[serial]
    fn extend_rejects_non_positive_minutes() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());
        let lock_id = setup_with_lease();

        let result = cmd_extend(ExtendArgs {
            lock_id,
            minutes: 0,
            user: Some("alice".to_string()),
        });
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().exit_code(),
            crate::exit_codes::VALIDATION_FAILURE
        );
    }
}
