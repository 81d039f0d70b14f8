//! On-disk snapshot store used by the CLI.
//!
//! The engine itself is in-memory and carries no durability invariant; the
//! CLI needs separate invocations to share one authoritative lease set, so
//! it persists the active snapshot as JSON under a state directory:
//!
//! - `.filelease/config.yaml`: engine configuration
//! - `.filelease/state.json`: active leases (expiry-filtered on save)
//! - `.filelease/events.ndjson`: append-only audit log
//! - `.filelease/store.lock`: guard file serializing read-modify-write
//!
//! The guard file is created with **create_new** semantics (exclusive
//! create) so only one process mutates the snapshot at a time, and carries
//! JSON metadata (owner, pid, timestamp, action) so a blocked caller can
//! see who is holding it. It is managed through an RAII guard that deletes
//! the file on drop.

use crate::config::LeaseConfig;
use crate::engine::types::FileLock;
use crate::error::{LeaseError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the state directory.
pub const STORE_DIR: &str = ".filelease";

/// Metadata stored in the guard file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardMetadata {
    /// Owner of the guard (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the holder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// When the guard was taken (RFC3339).
    pub created_at: DateTime<Utc>,

    /// The operation being performed (acquire/release/extend/etc.).
    pub action: String,
}

impl GuardMetadata {
    /// Create guard metadata with the current timestamp.
    pub fn new(owner: &str, action: &str) -> Self {
        Self {
            owner: owner.to_string(),
            pid: Some(std::process::id()),
            created_at: Utc::now(),
            action: action.to_string(),
        }
    }

    /// Parse guard metadata from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to read guard file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to parse guard file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Age of the guard.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let minutes = self.age().num_minutes();
        if minutes >= 60 {
            format!("{}h {}m", minutes / 60, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

/// RAII guard for the store's guard file.
///
/// When dropped, the guard file is deleted. If deletion fails, a warning
/// is printed but no panic occurs.
#[derive(Debug)]
pub struct StoreGuard {
    path: PathBuf,
    released: bool,
}

impl StoreGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Manually release the guard, surfacing deletion errors.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to release store guard '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for StoreGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = fs::remove_file(&self.path)
        {
            eprintln!(
                "Warning: failed to release store guard '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Handle to one state directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Store rooted at an explicit directory (the `.filelease` dir itself).
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Store under the current working directory.
    pub fn open_current() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            LeaseError::UserError(format!("failed to resolve current directory: {}", e))
        })?;
        Ok(Self::new(cwd.join(STORE_DIR)))
    }

    /// Path to the state directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to `config.yaml`.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    /// Path to `state.json`.
    pub fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    /// Path to `events.ndjson`.
    pub fn events_path(&self) -> PathBuf {
        self.root.join("events.ndjson")
    }

    /// Path to the guard file.
    pub fn guard_path(&self) -> PathBuf {
        self.root.join("store.lock")
    }

    /// Whether `init` has been run here.
    pub fn is_initialized(&self) -> bool {
        self.config_path().exists()
    }

    /// Create the state directory with a default config and empty state.
    pub fn init(&self) -> Result<()> {
        if self.is_initialized() {
            return Err(LeaseError::UserError(format!(
                "store already initialized at '{}'",
                self.root.display()
            )));
        }

        fs::create_dir_all(&self.root).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to create store directory '{}': {}",
                self.root.display(),
                e
            ))
        })?;

        let config = LeaseConfig::default();
        write_atomic(&self.config_path(), config.to_yaml()?.as_bytes())?;
        self.save_locks(&[])?;

        Ok(())
    }

    /// Load the config, falling back to defaults when the file is missing.
    pub fn load_config(&self) -> Result<LeaseConfig> {
        if !self.config_path().exists() {
            return Ok(LeaseConfig::default());
        }
        LeaseConfig::load(self.config_path())
    }

    /// Load the persisted lease set. Missing state reads as empty.
    pub fn load_locks(&self) -> Result<Vec<FileLock>> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to read state file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to parse state file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Persist a lease set, replacing the previous snapshot.
    pub fn save_locks(&self, locks: &[FileLock]) -> Result<()> {
        let json = serde_json::to_string_pretty(locks)
            .map_err(|e| LeaseError::UserError(format!("failed to serialize state: {}", e)))?;
        write_atomic(&self.state_path(), json.as_bytes())
    }

    /// Take the store guard, serializing snapshot read-modify-write against
    /// other processes.
    ///
    /// Fails with a descriptive error if another process holds the guard.
    pub fn lock(&self, owner: &str, action: &str) -> Result<StoreGuard> {
        let guard_path = self.guard_path();

        if let Some(parent) = guard_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                LeaseError::UserError(format!(
                    "failed to create store directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let metadata = GuardMetadata::new(owner, action);

        // Exclusive create: only one process can hold the guard.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&guard_path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    let holder = match GuardMetadata::from_file(&guard_path) {
                        Ok(meta) => format!(
                            "\nGuard: {} (taken {} ago by {})\nAction: {}",
                            guard_path.display(),
                            meta.age_string(),
                            meta.owner,
                            meta.action
                        ),
                        Err(_) => format!("\nGuard: {}", guard_path.display()),
                    };
                    LeaseError::UserError(format!(
                        "store is in use by another process{}",
                        holder
                    ))
                } else {
                    LeaseError::UserError(format!(
                        "failed to take store guard '{}': {}",
                        guard_path.display(),
                        e
                    ))
                }
            })?;

        let json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| LeaseError::UserError(format!("failed to serialize guard: {}", e)))?;
        file.write_all(json.as_bytes()).map_err(|e| {
            let _ = fs::remove_file(&guard_path);
            LeaseError::UserError(format!("failed to write guard metadata: {}", e))
        })?;
        file.sync_all().map_err(|e| {
            let _ = fs::remove_file(&guard_path);
            LeaseError::UserError(format!("failed to sync guard file: {}", e))
        })?;

        Ok(StoreGuard::new(guard_path))
    }
}

/// Write a file via a temporary sibling and rename, so the snapshot is
/// never observable half-written.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LeaseError::UserError(format!("invalid path '{}'", path.display())))?;
    let temp_path = parent.join(format!(".{}.tmp", file_name));

    let mut file = fs::File::create(&temp_path).map_err(|e| {
        LeaseError::UserError(format!(
            "failed to create temporary file '{}': {}",
            temp_path.display(),
            e
        ))
    })?;
    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LeaseError::UserError(format!("failed to write temporary file: {}", e))
    })?;
    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LeaseError::UserError(format!("failed to sync temporary file: {}", e))
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LeaseError::UserError(format!(
            "failed to replace '{}': {}",
            path.display(),
            e
        ))
    })
}
