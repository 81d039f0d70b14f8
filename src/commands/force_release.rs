//! Implementation of the `filelease force-release` command.

use crate::cli::ForceReleaseArgs;
use crate::error::{LeaseError, Result};
use crate::events::{Event, EventAction};
use serde_json::json;

/// Execute the `filelease force-release` command.
///
/// Releases one lease without the ownership check. Requires `--force` so
/// a mistyped `release` cannot silently bypass the gate.
pub fn cmd_force_release(args: ForceReleaseArgs) -> Result<()> {
    if !args.force {
        return Err(LeaseError::UserError(format!(
            "refusing to force-release without --force flag.\n\n\
             Force-releasing takes a lease away from its holder, who may still\n\
             be editing the file. Prefer asking the holder to release, or wait\n\
             for the lease to expire.\n\n\
             To proceed anyway, run:\n  filelease force-release {} --force",
            args.lock_id
        )));
    }

    let store = super::require_initialized_store()?;
    let user = super::get_user_string();
    let _guard = store.lock(&user, "force-release")?;

    let service = super::load_service(&store)?;
    let released = service.force_release_lock(&args.lock_id)?;
    super::save_service(&store, &service)?;

    let event = Event::new(EventAction::ForceRelease, &user)
        .with_feature(&released.feature_id)
        .with_details(json!({
            "lock_id": released.id,
            "project": released.project_path,
            "file": released.file_path,
            "holder": released.locked_by,
        }));
    super::log_event(&store, event);

    println!(
        "Force-released {} ({} in {}, was held by {}).",
        released.id, released.file_path, released.project_path, released.locked_by
    );

    Ok(())
}
