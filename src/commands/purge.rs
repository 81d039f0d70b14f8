//! Implementation of the `filelease purge` command.

use crate::error::Result;
use crate::events::{Event, EventAction};
use serde_json::json;

/// Execute the `filelease purge` command.
///
/// Physically removes expired lease records from the snapshot. Purely
/// housekeeping: expired leases are already invisible to every other
/// command, so skipping purge never changes observable behavior.
pub fn cmd_purge() -> Result<()> {
    let store = super::require_initialized_store()?;
    let user = super::get_user_string();
    let _guard = store.lock(&user, "purge")?;

    let service = super::load_service(&store)?;
    let purged = service.purge_expired();
    super::save_service(&store, &service)?;

    let event = Event::new(EventAction::Purge, &user)
        .with_details(json!({ "purged": purged }));
    super::log_event(&store, event);

    if purged == 0 {
        println!("No expired lease records to purge.");
    } else {
        println!("Purged {} expired lease record(s).", purged);
    }

    Ok(())
}
