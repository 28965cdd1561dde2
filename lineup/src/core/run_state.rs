//! Per-run mutable bookkeeping.
//!
//! One `RunState` is owned by exactly one workflow execution. Only the
//! generator action writes the call counter; only the budget condition reads it.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunState {
    call_count: Option<u32>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the call counter to zero if it has never been set.
    ///
    /// Returns `true` when this call performed the initialization.
    pub fn initialize(&mut self) -> bool {
        if self.call_count.is_some() {
            return false;
        }
        self.call_count = Some(0);
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.call_count.is_some()
    }

    /// Model calls made so far (`None` before initialization).
    pub fn call_count(&self) -> Option<u32> {
        self.call_count
    }

    /// Count one model call and return the new total.
    ///
    /// Must run before the call is issued so failed calls still consume budget.
    pub fn record_call(&mut self) -> u32 {
        let next = self.call_count.unwrap_or(0).saturating_add(1);
        self.call_count = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let mut state = RunState::new();
        assert_eq!(state.call_count(), None);
        assert!(state.initialize());
        assert!(!state.initialize());
        assert!(!state.initialize());
        assert_eq!(state.call_count(), Some(0));
    }

    #[test]
    fn initialize_does_not_reset_recorded_calls() {
        let mut state = RunState::new();
        state.initialize();
        state.record_call();
        state.record_call();
        assert!(!state.initialize());
        assert_eq!(state.call_count(), Some(2));
    }

    #[test]
    fn record_call_counts_each_attempt() {
        let mut state = RunState::new();
        state.initialize();
        for expected in 1..=5 {
            assert_eq!(state.record_call(), expected);
        }
        assert_eq!(state.call_count(), Some(5));
    }
}
