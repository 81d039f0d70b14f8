//! Read-only rollups over the active lease set.

use super::types::FileLock;
use serde::Serialize;
use std::collections::BTreeMap;

/// Active-lease counts grouped by project and by owning user.
///
/// Computed from a single expiry-filtered snapshot so expired records are
/// never counted. BTreeMaps keep the rendering order stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LockStats {
    /// Total number of active leases.
    pub total_active: usize,
    /// Active leases per project.
    pub by_project: BTreeMap<String, usize>,
    /// Active leases per owning user.
    pub by_user: BTreeMap<String, usize>,
}

impl LockStats {
    /// Aggregate a snapshot of active leases.
    pub fn compute(locks: &[FileLock]) -> Self {
        let mut stats = Self {
            total_active: locks.len(),
            ..Self::default()
        };

        for lock in locks {
            *stats.by_project.entry(lock.project_path.clone()).or_default() += 1;
            *stats.by_user.entry(lock.locked_by.clone()).or_default() += 1;
        }

        stats
    }
}
