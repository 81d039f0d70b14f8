//! Implementation of the `filelease init` command.

use crate::error::Result;
use crate::events::{Event, EventAction};
use crate::store::Store;

/// Execute the `filelease init` command.
///
/// Creates `.filelease/` under the current directory with a default
/// configuration and an empty lease set. Fails if the store already
/// exists, so a stray re-run cannot wipe live state.
pub fn cmd_init() -> Result<()> {
    let store = Store::open_current()?;
    store.init()?;

    let user = super::get_user_string();
    super::log_event(&store, Event::new(EventAction::Init, &user));

    println!("Initialized lease store at {}", store.root().display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to adjust lease durations", store.config_path().display());
    println!("  2. Acquire leases with `filelease acquire --project <P> --feature <F> <FILES>...`");

    Ok(())
}
