//! Terminal report for runs that can make no further progress.

use crate::core::types::{Resolution, StuckResult};

/// Explanation shown to the user when the run gives up.
pub const STUCK_MESSAGE: &str =
    "Cannot complete lineup: exceeded retry limit to avoid excessive model cost";

/// Build the non-retriable failure report for a stuck run.
///
/// Never calls the model and never fabricates a lineup.
pub fn handle_stuck(run_id: &str, call_count: u32) -> StuckResult {
    StuckResult {
        run_id: run_id.to_string(),
        message: STUCK_MESSAGE.to_string(),
        resolution: Resolution::NoResolution,
        call_count,
    }
}
