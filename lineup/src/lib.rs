//! Baseball lineup assignment driven by a goal-directed action graph.
//!
//! A model proposes field positions for a list of player names; the workflow
//! validates each proposal and retries under a bounded call budget until a
//! lineup is accepted or the run is stuck. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (conditions, action selection,
//!   run state, stuck reports). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, process execution, prompt
//!   rendering, diagnostics). Isolated to enable scripted executors in tests.
//!
//! Orchestration modules ([`workflow`], [`validate`]) coordinate core logic with
//! I/O to implement CLI commands.

pub mod agents;
pub mod cancel;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
pub mod workflow;
