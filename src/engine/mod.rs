//! Lease engine for filelease.
//!
//! This module implements the file-lock and conflict-detection core:
//! - In-memory lock table keyed by `(project, normalized file path)`
//! - Pure conflict detection (dry-run capable, never mutates)
//! - All-or-nothing multi-file acquisition inside one critical section
//! - Owner-gated release and extension, admin force-release
//! - Lazy lease expiry: an expired lease is invisible to every read path
//!   whether or not it has been physically purged
//!
//! # Concurrency
//!
//! The table lives behind a single `RwLock` owned by [`LeaseService`].
//! Acquisition takes the write guard across conflict evaluation *and* lease
//! insertion, so two concurrent requests for overlapping files can never
//! both observe "no conflict" before either writes. Pure reads (conflict
//! previews, listings, stats) take the read guard and may run concurrently.
//!
//! # Expiry
//!
//! "Expired" is a derived predicate (`now >= expires_at`) applied on every
//! read, not a state kept up to date by a background timer. Physical purge
//! ([`LeaseService::purge_expired`]) only reclaims memory.

pub mod conflict;
pub mod service;
pub mod stats;
pub mod table;
pub mod types;


// Re-export public API
pub use conflict::{ConflictCheck, FileConflict, FileReport};
pub use service::{AcquireRequest, LeaseService};
pub use stats::LockStats;
pub use table::LockTable;
pub use types::{FileLock, LockType, normalize_path};
