//! CLI argument parsing for filelease.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// Filelease: coordinate concurrent edits to shared project files.
///
/// Callers declare the files they are about to modify for a feature and
/// receive time-bounded leases, so two tasks never silently clobber each
/// other's changes before either commits. State lives in `.filelease/`
/// under the current directory.
#[derive(Parser, Debug)]
#[command(name = "filelease")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for filelease.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the lease store in the current directory.
    ///
    /// Creates `.filelease/` with a default configuration and an empty
    /// lease set.
    Init,

    /// Preview which files would conflict, without acquiring anything.
    ///
    /// Reports, per file, whether an acquisition for the given feature
    /// would currently be blocked and by whom.
    Check(CheckArgs),

    /// Acquire leases on a set of files, all-or-nothing.
    ///
    /// Either every requested file is leased to the feature or none are;
    /// on conflict the blocking holders are reported.
    Acquire(AcquireArgs),

    /// Release every lease held by a feature.
    ReleaseFeature(ReleaseFeatureArgs),

    /// Release one lease. Requires the owning identity.
    Release(ReleaseArgs),

    /// Extend one lease. Requires the owning identity.
    Extend(ExtendArgs),

    /// Release one lease regardless of owner.
    ///
    /// For administrative use only; requires --force to prevent accidents.
    ForceRelease(ForceReleaseArgs),

    /// List active leases, optionally filtered by project and/or feature.
    List(ListArgs),

    /// Show active-lease counts by project and by user.
    Stats,

    /// Physically remove expired lease records.
    ///
    /// Purely memory/disk reclamation; expired leases are already ignored
    /// by every other command.
    Purge,

    /// Show the most recent audit events.
    Events(EventsArgs),
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Project the files belong to.
    #[arg(long)]
    pub project: String,

    /// Feature the check is on behalf of (its own leases never block it).
    #[arg(long)]
    pub feature: String,

    /// Files to check, project-relative.
    #[arg(required = true)]
    pub files: Vec<String>,
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Project the files belong to.
    #[arg(long)]
    pub project: String,

    /// Feature the leases are acquired for.
    #[arg(long)]
    pub feature: String,

    /// Acquiring identity. Defaults to `user@HOST`.
    #[arg(long)]
    pub user: Option<String>,

    /// Take shared leases instead of exclusive ones.
    #[arg(long)]
    pub shared: bool,

    /// Lease duration in minutes. Defaults to the configured value.
    #[arg(long)]
    pub duration_minutes: Option<i64>,

    /// Files to lease, project-relative.
    #[arg(required = true)]
    pub files: Vec<String>,
}

/// Arguments for the `release-feature` command.
#[derive(Parser, Debug)]
pub struct ReleaseFeatureArgs {
    /// Feature whose leases should all be released.
    pub feature: String,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Id of the lease to release.
    pub lock_id: String,

    /// Releasing identity; must match the lease owner. Defaults to
    /// `user@HOST`.
    #[arg(long)]
    pub user: Option<String>,
}

/// Arguments for the `extend` command.
#[derive(Parser, Debug)]
pub struct ExtendArgs {
    /// Id of the lease to extend.
    pub lock_id: String,

    /// Minutes to add to the lease expiry.
    #[arg(long)]
    pub minutes: i64,

    /// Extending identity; must match the lease owner. Defaults to
    /// `user@HOST`.
    #[arg(long)]
    pub user: Option<String>,
}

/// Arguments for the `force-release` command.
#[derive(Parser, Debug)]
pub struct ForceReleaseArgs {
    /// Id of the lease to release.
    pub lock_id: String,

    /// Confirm the ownership bypass (required for safety).
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only leases in this project.
    #[arg(long)]
    pub project: Option<String>,

    /// Only leases held by this feature.
    #[arg(long)]
    pub feature: Option<String>,
}

/// Arguments for the `events` command.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Number of most recent events to show.
    #[arg(long, default_value_t = 10)]
    pub tail: usize,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
