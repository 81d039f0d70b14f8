//! Filelease: file-lease engine for coordinating concurrent edits by
//! developers and coding agents sharing one repository checkout.
//!
//! A caller declares "I am about to modify these files for feature X" and
//! either receives a time-bounded lease on every requested file or a
//! per-file report of who holds the blocking leases. Leases are soft: they
//! expire on their own, can be extended by their owner, and can be removed
//! by an already-authorized administrative caller.
//!
//! The core lives in [`engine`]: an in-memory lock table behind a
//! read-write lock, so conflict evaluation and lease insertion happen in
//! one critical section and two overlapping requests can never both pass
//! the conflict check. Everything else is glue: configuration, the audit
//! event log, the on-disk snapshot store used by the CLI, and the CLI
//! itself.

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
