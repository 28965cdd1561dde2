//! Stable exit codes for lineup CLI commands.

/// Command succeeded (lineup produced, file valid).
pub const OK: i32 = 0;
/// Command failed due to invalid config/input, an invalid lineup file,
/// cancellation, or other errors.
pub const INVALID: i32 = 1;
/// `lineup generate` exhausted its call budget without a valid lineup.
pub const STUCK: i32 = 3;
