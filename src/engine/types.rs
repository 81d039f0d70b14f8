//! Lease record and lock type definitions.

use crate::error::{LeaseError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Type of lease on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockType {
    /// Blocks any other lease (of either type) on the same file.
    #[default]
    Exclusive,
    /// Coexists with other shared leases; blocked by and blocks exclusive.
    Shared,
}

impl LockType {
    /// Short name used in CLI output and audit events.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockType::Exclusive => "exclusive",
            LockType::Shared => "shared",
        }
    }

    /// Parse a lock type from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "exclusive" => Some(Self::Exclusive),
            "shared" => Some(Self::Shared),
            _ => None,
        }
    }
}

impl std::fmt::Display for LockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-bounded lease on one file, held by one feature and one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLock {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,

    /// Repository/workspace the lease belongs to.
    pub project_path: String,

    /// Unit of work the lease was acquired for; granularity of bulk release.
    pub feature_id: String,

    /// Normalized file path, unique key within a project for exclusive
    /// leases.
    pub file_path: String,

    /// Exclusive or shared.
    pub lock_type: LockType,

    /// Identity of the acquiring actor.
    pub locked_by: String,

    /// When the lease was granted.
    pub acquired_at: DateTime<Utc>,

    /// When the lease stops being honored. `acquired_at + duration`.
    pub expires_at: DateTime<Utc>,
}

impl FileLock {
    /// A lease is active iff `now < expires_at`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Inverse of [`FileLock::is_active`]. Expired leases must be treated
    /// as absent by every read path, even before physical purge.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.is_active(now)
    }

    /// Time left on the lease. Zero when expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Format the remaining time as a human-readable string.
    pub fn remaining_string(&self, now: DateTime<Utc>) -> String {
        let remaining = self.remaining(now);
        let minutes = remaining.num_minutes();
        let hours = remaining.num_hours();
        let days = remaining.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

impl std::fmt::Display for FileLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} on {}:{} (feature: {}, by: {})",
            self.id, self.lock_type, self.project_path, self.file_path, self.feature_id,
            self.locked_by
        )
    }
}

static LOCK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a lease id.
///
/// Microsecond timestamp plus a process-local sequence number keeps ids
/// unique across processes sharing one snapshot store without pulling in a
/// UUID dependency.
pub fn next_lock_id(now: DateTime<Utc>) -> String {
    let seq = LOCK_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("lock-{:x}-{:04x}", now.timestamp_micros(), seq & 0xffff)
}

/// Normalize a requested file path to the table's canonical form.
///
/// Normalization is purely lexical; the engine never consults the
/// filesystem. Backslashes become `/`, duplicate slashes collapse, `.` and
/// `..` components are resolved. Empty paths, absolute paths, and paths
/// escaping the project root are rejected.
pub fn normalize_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LeaseError::ValidationError(
            "file path is empty".to_string(),
        ));
    }

    let unified = trimmed.replace('\\', "/");

    if unified.starts_with('/') {
        return Err(LeaseError::ValidationError(format!(
            "file path '{}' is absolute; paths must be project-relative",
            trimmed
        )));
    }
    // Windows drive prefix (e.g., C:/...)
    if unified.len() >= 2 && unified.as_bytes()[1] == b':' {
        return Err(LeaseError::ValidationError(format!(
            "file path '{}' is absolute; paths must be project-relative",
            trimmed
        )));
    }

    let mut parts: Vec<&str> = Vec::new();
    for component in unified.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(LeaseError::ValidationError(format!(
                        "file path '{}' escapes the project root",
                        trimmed
                    )));
                }
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return Err(LeaseError::ValidationError(format!(
            "file path '{}' normalizes to nothing",
            trimmed
        )));
    }

    Ok(parts.join("/"))
}
