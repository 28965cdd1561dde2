//! Wall-clock budget helpers for bounding model calls.

use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};

/// Return the remaining time budget until the provided deadline.
pub fn remaining_budget(deadline: Instant) -> Result<Duration> {
    let remaining = deadline
        .checked_duration_since(Instant::now())
        .unwrap_or(Duration::from_secs(0));
    if remaining.is_zero() {
        return Err(anyhow!("run timed out"));
    }
    Ok(remaining)
}

/// Timeout for the next model call: the per-call limit, capped by the run deadline.
pub fn call_timeout(deadline: Instant, per_call: Duration) -> Result<Duration> {
    Ok(remaining_budget(deadline)?.min(per_call))
}
