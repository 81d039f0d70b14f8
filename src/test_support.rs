//! Shared fixtures for unit tests.

use crate::clock::Clock;
use crate::config::LeaseConfig;
use crate::engine::service::{AcquireRequest, LeaseService};
use crate::engine::types::LockType;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Test clock that only moves when told to.
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at a fixed, readable instant so failing assertions print
    /// stable timestamps.
    pub(crate) fn new() -> Arc<Self> {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub(crate) fn advance_minutes(&self, minutes: i64) {
        *self.guard() += Duration::minutes(minutes);
    }

    pub(crate) fn advance_seconds(&self, seconds: i64) {
        *self.guard() += Duration::seconds(seconds);
    }

    fn guard(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.guard()
    }
}

/// A service on a manual clock with default config.
pub(crate) fn manual_service() -> (Arc<LeaseService>, Arc<ManualClock>) {
    manual_service_with_config(LeaseConfig::default())
}

/// A service on a manual clock with the given config.
pub(crate) fn manual_service_with_config(
    config: LeaseConfig,
) -> (Arc<LeaseService>, Arc<ManualClock>) {
    let clock = ManualClock::new();
    let service = Arc::new(LeaseService::new(config, clock.clone()));
    (service, clock)
}

/// Switches the working directory for one test, restoring it on drop.
///
/// The working directory is process-global, so tests using this must be
/// marked `#[serial]`.
pub(crate) struct DirGuard {
    original: std::path::PathBuf,
}

impl DirGuard {
    pub(crate) fn new(path: &std::path::Path) -> Self {
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(path).unwrap();
        Self { original }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Exclusive-lock acquisition request with the default duration.
pub(crate) fn exclusive_request(
    project: &str,
    feature: &str,
    user: &str,
    files: &[&str],
) -> AcquireRequest {
    AcquireRequest {
        project_path: project.to_string(),
        feature_id: feature.to_string(),
        user_id: user.to_string(),
        files: files.iter().map(|s| s.to_string()).collect(),
        lock_type: LockType::Exclusive,
        duration_minutes: None,
    }
}

/// Shared-lock variant of [`exclusive_request`].
pub(crate) fn shared_request(
    project: &str,
    feature: &str,
    user: &str,
    files: &[&str],
) -> AcquireRequest {
    AcquireRequest {
        lock_type: LockType::Shared,
        ..exclusive_request(project, feature, user, files)
    }
}
