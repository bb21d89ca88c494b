//! Stable exit codes for the CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid config, I/O failure, or any other error.
pub const INVALID: i32 = 1;
/// `confine` or `parse-repo` refused its input.
pub const REJECTED: i32 = 2;
