//! Exit code constants for the filelease CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, uninitialized store, I/O problems)
//! - 2: Validation failure (empty file set, bad duration, bad path)
//! - 3: Conflict (requested files held by another feature)
//! - 4: Not found (lock id absent or already expired)
//! - 5: Permission denied (owner-gated operation by a non-owner)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, uninitialized store, or I/O failure.
pub const USER_ERROR: i32 = 1;

/// Validation failure: empty file set, non-positive or oversized duration,
/// or an unusable file path.
pub const VALIDATION_FAILURE: i32 = 2;

/// Conflict: the requested file set collides with active leases held by
/// another feature. No locks were created.
pub const CONFLICT: i32 = 3;

/// Not found: the targeted lock does not exist or has already expired.
pub const NOT_FOUND: i32 = 4;

/// Permission denied: owner-gated release/extend attempted by a
/// non-owning identity.
pub const DENIED: i32 = 5;
