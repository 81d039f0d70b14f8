//! Pure conflict detection over the lock table.
//!
//! Given a requested file set and intent, report which files would be
//! blocked by active leases held by *other* features. Never mutates; the
//! same logic backs both the dry-run preview and the real acquisition
//! (the latter re-runs it under the write guard).

use super::table::LockTable;
use super::types::LockType;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An active lease blocking one requested file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileConflict {
    /// The requested file (normalized).
    pub file_path: String,
    /// Feature holding the blocking lease.
    pub feature_id: String,
    /// User holding the blocking lease.
    pub locked_by: String,
    /// Type of the blocking lease.
    pub lock_type: LockType,
    /// When the blocking lease expires on its own.
    pub expires_at: DateTime<Utc>,
}

/// Per-file outcome of a conflict check: lock-free, or blocked by a holder.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The requested file (normalized).
    pub file_path: String,
    /// The blocking lease, if any.
    pub conflict: Option<FileConflict>,
}

/// Result of checking a requested file set against the table.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictCheck {
    /// One report per requested file, in request order.
    pub files: Vec<FileReport>,
}

impl ConflictCheck {
    /// Whether any requested file is blocked.
    pub fn has_conflicts(&self) -> bool {
        self.files.iter().any(|f| f.conflict.is_some())
    }

    /// The blocking leases, one per conflicting file.
    pub fn conflicts(&self) -> Vec<FileConflict> {
        self.files
            .iter()
            .filter_map(|f| f.conflict.clone())
            .collect()
    }
}

/// Check a file set against the current table state.
///
/// Leases already owned by `feature_id` never block the check: a feature
/// may re-check files it holds without self-blocking. A file conflicts
/// when another feature holds an exclusive lease on it, or when the
/// requesting intent is exclusive and another feature holds any lease on
/// it. Shared-on-shared is compatible.
///
/// `files` must already be normalized; `now` must be one consistent
/// snapshot for the whole check.
pub fn check_conflicts(
    table: &LockTable,
    project_path: &str,
    feature_id: &str,
    files: &[String],
    intent: LockType,
    now: DateTime<Utc>,
) -> ConflictCheck {
    let mut reports = Vec::with_capacity(files.len());

    for file in files {
        let holders: Vec<&super::types::FileLock> = table
            .active_on(project_path, file, now)
            .into_iter()
            .filter(|l| l.feature_id != feature_id)
            .collect();

        // Prefer reporting an exclusive holder; under shared intent only an
        // exclusive holder blocks at all.
        let blocking = holders
            .iter()
            .find(|l| l.lock_type == LockType::Exclusive)
            .or_else(|| {
                if intent == LockType::Exclusive {
                    holders.first()
                } else {
                    None
                }
            });

        reports.push(FileReport {
            file_path: file.clone(),
            conflict: blocking.map(|l| FileConflict {
                file_path: file.clone(),
                feature_id: l.feature_id.clone(),
                locked_by: l.locked_by.clone(),
                lock_type: l.lock_type,
                expires_at: l.expires_at,
            }),
        });
    }

    ConflictCheck { files: reports }
}
