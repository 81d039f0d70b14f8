//! Audit event log for filelease.
//!
//! Every mutating operation is appended to an NDJSON log (one JSON object
//! per line) next to the snapshot store. The log is append-only and
//! best-effort: a failure to record an event must never fail the
//! operation itself (callers decide, the CLI warns on stderr).
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: the operation performed (acquire/release/extend/...)
//! - `actor`: the identity on whose behalf it ran
//! - `feature`: optional feature id for feature-scoped events
//! - `details`: freeform object with action-specific details

use crate::error::{LeaseError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Store initialized
    Init,
    /// Leases granted for a file set
    Acquire,
    /// Single lease released by its owner
    Release,
    /// All leases of a feature released
    ReleaseFeature,
    /// Lease expiry pushed forward
    Extend,
    /// Lease released by an administrative caller
    ForceRelease,
    /// Expired records physically purged
    Purge,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::Acquire => write!(f, "acquire"),
            EventAction::Release => write!(f, "release"),
            EventAction::ReleaseFeature => write!(f, "release_feature"),
            EventAction::Extend => write!(f, "extend"),
            EventAction::ForceRelease => write!(f, "force_release"),
            EventAction::Purge => write!(f, "purge"),
        }
    }
}

/// One audit log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// When the event was recorded.
    pub ts: DateTime<Utc>,

    /// The operation performed.
    pub action: EventAction,

    /// Identity on whose behalf the operation ran.
    pub actor: String,

    /// Feature id, for feature-scoped operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,

    /// Action-specific details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Event {
    /// Create an event stamped with the current time.
    pub fn new(action: EventAction, actor: &str) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor.to_string(),
            feature: None,
            details: None,
        }
    }

    /// Attach a feature id.
    pub fn with_feature(mut self, feature: &str) -> Self {
        self.feature = Some(feature.to_string());
        self
    }

    /// Attach action-specific details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:<16} {}",
            self.ts.format("%Y-%m-%d %H:%M:%S"),
            self.action.to_string(),
            self.actor
        )?;
        if let Some(feature) = &self.feature {
            write!(f, " feature={}", feature)?;
        }
        if let Some(details) = &self.details {
            write!(f, " {}", details)?;
        }
        Ok(())
    }
}

/// Append an event to the log, creating the file on first use.
pub fn append_event(path: &Path, event: &Event) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to create events directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let line = serde_json::to_string(event)
        .map_err(|e| LeaseError::UserError(format!("failed to serialize event: {}", e)))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LeaseError::UserError(format!(
                "failed to open events log '{}': {}",
                path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", line).map_err(|e| {
        LeaseError::UserError(format!(
            "failed to append to events log '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read the last `limit` events from the log.
///
/// Lines that fail to parse are skipped rather than failing the read, so a
/// single corrupt line cannot make the whole log unreadable.
pub fn read_recent_events(path: &Path, limit: usize) -> Result<Vec<Event>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        LeaseError::UserError(format!(
            "failed to read events log '{}': {}",
            path.display(),
            e
        ))
    })?;

    let events: Vec<Event> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    let start = events.len().saturating_sub(limit);
    Ok(events[start..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn event_serializes_as_one_json_line() {
        let event = Event::new(EventAction::Acquire, "alice")
            .with_feature("FEAT-001")
            .with_details(json!({"files": 2, "lock_type": "exclusive"}));

        let line = serde_json::to_string(&event).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"acquire\""));
        assert!(line.contains("FEAT-001"));

        let parsed: Event = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.action, EventAction::Acquire);
        assert_eq!(parsed.actor, "alice");
        assert_eq!(parsed.feature.as_deref(), Some("FEAT-001"));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let event = Event::new(EventAction::Purge, "system");
        let line = serde_json::to_string(&event).unwrap();
        assert!(!line.contains("feature"));
        assert!(!line.contains("details"));
    }

    #[test]
    fn append_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("events.ndjson");

        for i in 0..5 {
            let event = Event::new(EventAction::Acquire, &format!("user-{}", i));
            append_event(&path, &event).unwrap();
        }

        let all = read_recent_events(&path, 100).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].actor, "user-0");

        let tail = read_recent_events(&path, 2).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].actor, "user-3");
        assert_eq!(tail[1].actor, "user-4");
    }

    #[test]
    fn append_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("events.ndjson");

        append_event(&path, &Event::new(EventAction::Init, "alice")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn read_missing_log_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("events.ndjson");
        assert!(read_recent_events(&path, 10).unwrap().is_empty());
    }

    #[test]
    fn corrupt_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("events.ndjson");

        append_event(&path, &Event::new(EventAction::Init, "alice")).unwrap();
        fs::write(
            &path,
            format!(
                "{}\nnot json at all\n",
                fs::read_to_string(&path).unwrap().trim_end()
            ),
        )
        .unwrap();
        append_event(&path, &Event::new(EventAction::Purge, "bob")).unwrap();

        let events = read_recent_events(&path, 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].actor, "bob");
    }

    #[test]
    fn display_is_human_readable() {
        let event = Event::new(EventAction::Extend, "alice")
            .with_feature("FEAT-001")
            .with_details(json!({"minutes": 30}));
        let rendered = event.to_string();
        assert!(rendered.contains("extend"));
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("feature=FEAT-001"));
    }
}
