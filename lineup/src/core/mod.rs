//! Deterministic, pure logic shared by the lineup workflow.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod budget;
pub mod conditions;
pub mod graph;
pub mod run_state;
pub mod stuck;
pub mod types;
