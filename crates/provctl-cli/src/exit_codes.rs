//! Standard exit codes for CLI operations

/// Success - operation completed without errors
pub const SUCCESS: u8 = 0;

/// General error - any failure reported by provctl
pub const ERROR: u8 = 1;
