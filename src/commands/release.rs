//! Implementations of `filelease release` and `filelease release-feature`.

use crate::cli::{ReleaseArgs, ReleaseFeatureArgs};
use crate::error::Result;
use crate::events::{Event, EventAction};
use serde_json::json;

/// Execute the `filelease release` command.
///
/// Releases one lease by id. The caller identity must match the lease
/// holder; use `force-release` to bypass that check.
pub fn cmd_release(args: ReleaseArgs) -> Result<()> {
    let store = super::require_initialized_store()?;
    let user = super::resolve_user(&args.user);
    let _guard = store.lock(&user, "release")?;

    let service = super::load_service(&store)?;
    let released = service.release_lock(&args.lock_id, &user)?;
    super::save_service(&store, &service)?;

    let event = Event::new(EventAction::Release, &user)
        .with_feature(&released.feature_id)
        .with_details(json!({
            "lock_id": released.id,
            "project": released.project_path,
            "file": released.file_path,
        }));
    super::log_event(&store, event);

    println!(
        "Released {} ({} in {}).",
        released.id, released.file_path, released.project_path
    );

    Ok(())
}

/// Execute the `filelease release-feature` command.
///
/// Releases every lease the feature holds, in any project. Idempotent: a
/// feature with no leases releases zero and succeeds.
pub fn cmd_release_feature(args: ReleaseFeatureArgs) -> Result<()> {
    let store = super::require_initialized_store()?;
    let user = super::get_user_string();
    let _guard = store.lock(&user, "release-feature")?;

    let service = super::load_service(&store)?;
    let released = service.release_feature(&args.feature);
    super::save_service(&store, &service)?;

    let event = Event::new(EventAction::ReleaseFeature, &user)
        .with_feature(&args.feature)
        .with_details(json!({ "released": released }));
    super::log_event(&store, event);

    if released == 0 {
        println!("Feature {} holds no active leases.", args.feature);
    } else {
        println!("Released {} lease(s) held by {}.", released, args.feature);
    }

    Ok(())
}
