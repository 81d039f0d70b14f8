//! Implementation of the `filelease check` command.
//!
//! A read-only dry run of acquisition: reports, per file, whether the
//! feature could lease it right now and who is in the way otherwise. Never
//! takes the store guard and never mutates anything, so it is safe to run
//! in a loop while waiting for a conflicting lease to clear.

use crate::cli::CheckArgs;
use crate::engine::types::LockType;
use crate::error::Result;

/// Execute the `filelease check` command.
pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let store = super::require_initialized_store()?;
    let service = super::load_service(&store)?;

    let check = service.check_conflicts(
        &args.project,
        &args.feature,
        &args.files,
        LockType::Exclusive,
    )?;

    for report in &check.files {
        match &report.conflict {
            None => println!("  {}  free", report.file_path),
            Some(conflict) => println!(
                "  {}  blocked by {} ({}, {} lock, expires {})",
                report.file_path,
                conflict.feature_id,
                conflict.locked_by,
                conflict.lock_type,
                conflict.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        }
    }

    println!();
    if check.has_conflicts() {
        let blocked = check.conflicts().len();
        println!(
            "{} of {} file(s) blocked; acquisition would be refused.",
            blocked,
            check.files.len()
        );
    } else {
        println!("All {} file(s) free; acquisition would succeed.", check.files.len());
    }

    Ok(())
}
