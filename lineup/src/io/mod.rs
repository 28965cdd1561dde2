//! I/O helpers for lineup commands.

pub mod attempt_log;
pub mod config;
pub mod executor;
pub mod process;
pub mod prompt;
