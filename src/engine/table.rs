//! The authoritative in-memory lock table.
//!
//! Maps `(project, normalized file path)` to the leases on that file. The
//! table itself is synchronization-free; [`crate::engine::LeaseService`]
//! owns the `RwLock` around it and is the only component allowed to mutate
//! it. Expired leases may linger physically until a purge; every accessor
//! that matters takes `now` and filters them out.

use super::types::FileLock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Map from project path to file path to the leases on that file.
#[derive(Debug, Default)]
pub struct LockTable {
    projects: HashMap<String, HashMap<String, Vec<FileLock>>>,
}

impl LockTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a previously exported snapshot.
    pub fn from_locks(locks: Vec<FileLock>) -> Self {
        let mut table = Self::new();
        for lock in locks {
            table.insert(lock);
        }
        table
    }

    /// Total number of physical records, expired ones included.
    pub fn len(&self) -> usize {
        self.projects
            .values()
            .flat_map(|files| files.values())
            .map(|leases| leases.len())
            .sum()
    }

    /// Whether the table holds no physical records at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a lease record. The caller is responsible for having checked
    /// conflicts under the same write guard.
    pub fn insert(&mut self, lock: FileLock) {
        self.projects
            .entry(lock.project_path.clone())
            .or_default()
            .entry(lock.file_path.clone())
            .or_default()
            .push(lock);
    }

    /// Active leases on one `(project, file)` pair.
    pub fn active_on(&self, project: &str, file: &str, now: DateTime<Utc>) -> Vec<&FileLock> {
        self.projects
            .get(project)
            .and_then(|files| files.get(file))
            .map(|leases| leases.iter().filter(|l| l.is_active(now)).collect())
            .unwrap_or_default()
    }

    /// Iterate over every physical record.
    pub fn iter(&self) -> impl Iterator<Item = &FileLock> {
        self.projects
            .values()
            .flat_map(|files| files.values())
            .flatten()
    }

    /// Clone of every lease active at `now`.
    pub fn active_snapshot(&self, now: DateTime<Utc>) -> Vec<FileLock> {
        self.iter()
            .filter(|l| l.is_active(now))
            .cloned()
            .collect()
    }

    /// Find a lease by id, whether or not it has expired.
    pub fn find(&self, lock_id: &str) -> Option<&FileLock> {
        self.iter().find(|l| l.id == lock_id)
    }

    /// Remove a lease by id and return it.
    pub fn remove(&mut self, lock_id: &str) -> Option<FileLock> {
        for files in self.projects.values_mut() {
            for leases in files.values_mut() {
                if let Some(pos) = leases.iter().position(|l| l.id == lock_id) {
                    let removed = leases.remove(pos);
                    self.drop_empty_buckets();
                    return Some(removed);
                }
            }
        }
        None
    }

    /// Push a lease's expiry forward by `minutes` and return the updated
    /// record. `None` if the id is unknown.
    pub fn extend(&mut self, lock_id: &str, minutes: i64) -> Option<FileLock> {
        for files in self.projects.values_mut() {
            for leases in files.values_mut() {
                if let Some(lock) = leases.iter_mut().find(|l| l.id == lock_id) {
                    lock.expires_at += chrono::Duration::minutes(minutes);
                    return Some(lock.clone());
                }
            }
        }
        None
    }

    /// Remove every lease belonging to a feature, expired records included,
    /// and return them.
    pub fn remove_feature(&mut self, feature_id: &str) -> Vec<FileLock> {
        let mut removed = Vec::new();
        for files in self.projects.values_mut() {
            for leases in files.values_mut() {
                let mut kept = Vec::with_capacity(leases.len());
                for lock in leases.drain(..) {
                    if lock.feature_id == feature_id {
                        removed.push(lock);
                    } else {
                        kept.push(lock);
                    }
                }
                *leases = kept;
            }
        }
        self.drop_empty_buckets();
        removed
    }

    /// Physically drop every record expired at `now`; returns how many were
    /// removed. Memory reclamation only, never required for correctness.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        for files in self.projects.values_mut() {
            for leases in files.values_mut() {
                let before = leases.len();
                leases.retain(|l| l.is_active(now));
                purged += before - leases.len();
            }
        }
        self.drop_empty_buckets();
        purged
    }

    fn drop_empty_buckets(&mut self) {
        for files in self.projects.values_mut() {
            files.retain(|_, leases| !leases.is_empty());
        }
        self.projects.retain(|_, files| !files.is_empty());
    }
}
