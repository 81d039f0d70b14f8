//! The lease service: acquisition coordinator and lease lifecycle manager.
//!
//! `LeaseService` owns the lock table behind a `RwLock` and is the only
//! component that mutates it. Acquisition holds the write guard across
//! conflict evaluation and lease insertion; without that single critical
//! section two callers requesting overlapping files could each observe "no
//! conflict" before either writes.
//!
//! The service is constructed explicitly (table + clock + config) rather
//! than living in a module-level singleton, so tests can run independent
//! instances with a mocked clock.

use super::conflict::{self, ConflictCheck};
use super::stats::LockStats;
use super::table::LockTable;
use super::types::{self, FileLock, LockType};
use crate::clock::Clock;
use crate::config::LeaseConfig;
use crate::error::{LeaseError, Result};
use chrono::Duration;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A request to lease a set of files for one feature.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    /// Repository/workspace the leases belong to.
    pub project_path: String,
    /// Unit of work the leases are acquired for.
    pub feature_id: String,
    /// Identity of the acquiring actor.
    pub user_id: String,
    /// Requested file paths (raw; normalized and deduplicated here).
    pub files: Vec<String>,
    /// Exclusive or shared.
    pub lock_type: LockType,
    /// Lease duration; `None` uses the configured default.
    pub duration_minutes: Option<i64>,
}

/// In-memory lease engine over one authoritative lock table.
pub struct LeaseService {
    table: RwLock<LockTable>,
    clock: Arc<dyn Clock>,
    config: LeaseConfig,
}

impl LeaseService {
    /// Create an empty service with the given clock.
    pub fn new(config: LeaseConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(LockTable::new()),
            clock,
            config,
        }
    }

    /// Create an empty service on wall-clock time.
    pub fn with_system_clock(config: LeaseConfig) -> Self {
        Self::new(config, Arc::new(crate::clock::SystemClock))
    }

    /// Replace the table contents with a previously exported snapshot.
    pub fn load_snapshot(&self, locks: Vec<FileLock>) {
        *self.write_table() = LockTable::from_locks(locks);
    }

    /// Export the active lease set, for persistence by the caller.
    pub fn snapshot(&self) -> Vec<FileLock> {
        let now = self.clock.now();
        let mut locks = self.read_table().active_snapshot(now);
        sort_locks(&mut locks);
        locks
    }

    /// Dry-run conflict check: which of these files would an acquisition
    /// for `feature_id` be blocked on right now? Never mutates; callable
    /// any number of times.
    pub fn check_conflicts(
        &self,
        project_path: &str,
        feature_id: &str,
        files: &[String],
        intent: LockType,
    ) -> Result<ConflictCheck> {
        require_id(project_path, "project path")?;
        require_id(feature_id, "feature id")?;
        let files = normalize_files(files)?;

        let table = self.read_table();
        let now = self.clock.now();
        Ok(conflict::check_conflicts(
            &table,
            project_path,
            feature_id,
            &files,
            intent,
            now,
        ))
    }

    /// Acquire leases on every requested file, or on none of them.
    ///
    /// The write guard spans the conflict check and the insertions, so the
    /// whole acquisition is atomic with respect to any other acquisition or
    /// release touching the same files. On conflict, the per-file holders
    /// are returned in [`LeaseError::Conflict`] and no locks are created.
    pub fn acquire(&self, request: &AcquireRequest) -> Result<Vec<FileLock>> {
        require_id(&request.project_path, "project path")?;
        require_id(&request.feature_id, "feature id")?;
        require_id(&request.user_id, "user id")?;
        let files = normalize_files(&request.files)?;
        let duration = self.validate_duration(request.duration_minutes)?;

        // Critical section: check + write under one guard, one `now`.
        let mut table = self.write_table();
        let now = self.clock.now();

        let check = conflict::check_conflicts(
            &table,
            &request.project_path,
            &request.feature_id,
            &files,
            request.lock_type,
            now,
        );
        if check.has_conflicts() {
            return Err(LeaseError::Conflict(check.conflicts()));
        }

        let expires_at = now + Duration::minutes(duration);
        let locks: Vec<FileLock> = files
            .into_iter()
            .map(|file_path| FileLock {
                id: types::next_lock_id(now),
                project_path: request.project_path.clone(),
                feature_id: request.feature_id.clone(),
                file_path,
                lock_type: request.lock_type,
                locked_by: request.user_id.clone(),
                acquired_at: now,
                expires_at,
            })
            .collect();

        for lock in &locks {
            table.insert(lock.clone());
        }

        Ok(locks)
    }

    /// Release every lease belonging to a feature. Returns the number of
    /// still-active leases released; repeating the call returns 0.
    pub fn release_feature(&self, feature_id: &str) -> usize {
        let mut table = self.write_table();
        let now = self.clock.now();
        table
            .remove_feature(feature_id)
            .iter()
            .filter(|l| l.is_active(now))
            .count()
    }

    /// Release one lease, owner-gated.
    ///
    /// Not-found covers both "no such id" and "already expired" (an expired
    /// lease is logically absent). A mismatched identity is reported as
    /// denied, distinctly, so callers can tell "no such lock" from "not
    /// yours".
    pub fn release_lock(&self, lock_id: &str, user_id: &str) -> Result<FileLock> {
        let mut table = self.write_table();
        let now = self.clock.now();

        let lock = match table.find(lock_id) {
            None => return Err(LeaseError::NotFound(lock_id.to_string())),
            Some(l) => l.clone(),
        };

        if lock.is_expired(now) {
            // Logically absent; reclaim the record while we hold the guard.
            let _ = table.remove(lock_id);
            return Err(LeaseError::NotFound(format!(
                "{} (expired {})",
                lock_id, lock.expires_at
            )));
        }

        if lock.locked_by != user_id {
            return Err(LeaseError::Denied(format!(
                "lock {} is held by '{}', not '{}'",
                lock_id, lock.locked_by, user_id
            )));
        }

        let _ = table.remove(lock_id);
        Ok(lock)
    }

    /// Extend one lease, owner-gated and bounded per call.
    ///
    /// An expired lease cannot be resurrected; the caller must re-acquire.
    pub fn extend_lock(
        &self,
        lock_id: &str,
        user_id: &str,
        additional_minutes: i64,
    ) -> Result<FileLock> {
        if additional_minutes <= 0 {
            return Err(LeaseError::ValidationError(format!(
                "extension must be positive, got {} minutes",
                additional_minutes
            )));
        }
        if additional_minutes > self.config.max_extension_minutes {
            return Err(LeaseError::ValidationError(format!(
                "extension of {} minutes exceeds the {} minute cap",
                additional_minutes, self.config.max_extension_minutes
            )));
        }

        let mut table = self.write_table();
        let now = self.clock.now();

        let lock = match table.find(lock_id) {
            None => return Err(LeaseError::NotFound(lock_id.to_string())),
            Some(l) => l.clone(),
        };

        if lock.is_expired(now) {
            let _ = table.remove(lock_id);
            return Err(LeaseError::NotFound(format!(
                "{} (expired {}, re-acquire instead of extending)",
                lock_id, lock.expires_at
            )));
        }

        if lock.locked_by != user_id {
            return Err(LeaseError::Denied(format!(
                "lock {} is held by '{}', not '{}'",
                lock_id, lock.locked_by, user_id
            )));
        }

        table
            .extend(lock_id, additional_minutes)
            .ok_or_else(|| LeaseError::NotFound(lock_id.to_string()))
    }

    /// Release one lease without an ownership check.
    ///
    /// The caller is an already-authorized administrative identity; the
    /// engine does not resolve roles. Same not-found semantics as
    /// [`LeaseService::release_lock`].
    pub fn force_release_lock(&self, lock_id: &str) -> Result<FileLock> {
        let mut table = self.write_table();
        let now = self.clock.now();

        let lock = match table.remove(lock_id) {
            None => return Err(LeaseError::NotFound(lock_id.to_string())),
            Some(l) => l,
        };

        if lock.is_expired(now) {
            return Err(LeaseError::NotFound(format!(
                "{} (expired {})",
                lock_id, lock.expires_at
            )));
        }

        Ok(lock)
    }

    /// Active leases held by one feature.
    pub fn locks_for_feature(&self, feature_id: &str) -> Vec<FileLock> {
        self.filtered(|l| l.feature_id == feature_id)
    }

    /// Active leases within one project.
    pub fn locks_for_project(&self, project_path: &str) -> Vec<FileLock> {
        self.filtered(|l| l.project_path == project_path)
    }

    /// All active leases.
    pub fn all_locks(&self) -> Vec<FileLock> {
        self.filtered(|_| true)
    }

    /// Aggregate counts over one expiry-filtered snapshot.
    pub fn stats(&self) -> LockStats {
        let now = self.clock.now();
        let snapshot = self.read_table().active_snapshot(now);
        LockStats::compute(&snapshot)
    }

    /// Physically drop expired records. Optional memory reclamation; every
    /// read path already ignores expired leases.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.write_table().purge_expired(now)
    }

    fn filtered(&self, keep: impl Fn(&FileLock) -> bool) -> Vec<FileLock> {
        let now = self.clock.now();
        let table = self.read_table();
        let mut locks: Vec<FileLock> = table
            .iter()
            .filter(|l| l.is_active(now) && keep(l))
            .cloned()
            .collect();
        sort_locks(&mut locks);
        locks
    }

    fn validate_duration(&self, requested: Option<i64>) -> Result<i64> {
        let duration = requested.unwrap_or(self.config.default_duration_minutes);
        if duration <= 0 {
            return Err(LeaseError::ValidationError(format!(
                "duration must be positive, got {} minutes",
                duration
            )));
        }
        if duration > self.config.max_duration_minutes {
            return Err(LeaseError::ValidationError(format!(
                "duration of {} minutes exceeds the {} minute cap",
                duration, self.config.max_duration_minutes
            )));
        }
        Ok(duration)
    }

    fn read_table(&self) -> RwLockReadGuard<'_, LockTable> {
        self.table
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, LockTable> {
        self.table
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

/// Normalize and deduplicate a requested file set, preserving order.
fn normalize_files(files: &[String]) -> Result<Vec<String>> {
    if files.is_empty() {
        return Err(LeaseError::ValidationError(
            "files list is empty".to_string(),
        ));
    }

    let mut normalized = Vec::with_capacity(files.len());
    for raw in files {
        let path = types::normalize_path(raw)?;
        if !normalized.contains(&path) {
            normalized.push(path);
        }
    }
    Ok(normalized)
}

fn require_id(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LeaseError::ValidationError(format!("{} is empty", name)));
    }
    Ok(())
}

/// Stable ordering for listings and snapshots.
fn sort_locks(locks: &mut [FileLock]) {
    locks.sort_by(|a, b| {
        (&a.project_path, &a.file_path, &a.acquired_at, &a.id).cmp(&(
            &b.project_path,
            &b.file_path,
            &b.acquired_at,
            &b.id,
        ))
    });
}
