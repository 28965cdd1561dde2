//! Named boolean conditions evaluated by the action graph.
//!
//! Every predicate here is pure: it reads the run state and the latest
//! artifacts and never mutates them.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::run_state::RunState;
use crate::core::types::{CandidateLineup, FinalLineup, Player, Position};

/// Reference budget ceiling: calls are admitted while `call_count <= 3`.
pub const DEFAULT_MAX_CALLS: u32 = 3;
/// Reference validity threshold: a lineup needs at least this many players.
pub const DEFAULT_MIN_ROSTER_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// The call counter has been set for this run.
    CallCounterInitialized,
    /// The generator may spend another model call.
    CanCallGenerator,
    /// The latest candidate is acceptable.
    ValidLineup,
    /// A final lineup exists (the goal).
    LineupComplete,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::CallCounterInitialized => "call_counter_initialized",
            Condition::CanCallGenerator => "can_call_generator",
            Condition::ValidLineup => "valid_lineup",
            Condition::LineupComplete => "lineup_complete",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds the conditions are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_calls: u32,
    pub min_roster_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            min_roster_size: DEFAULT_MIN_ROSTER_SIZE,
        }
    }
}

/// True while another model call fits within the budget.
///
/// An uninitialized counter counts as zero calls.
pub fn can_call_generator(state: &RunState, limits: &Limits) -> bool {
    state.call_count().unwrap_or(0) <= limits.max_calls
}

/// True when the candidate has at least `min_roster_size` players.
///
/// Position uniqueness is intentionally not checked here; see
/// [`duplicate_positions`] for the diagnostic.
pub fn is_valid_lineup(candidate: &CandidateLineup, limits: &Limits) -> bool {
    candidate.players.len() >= limits.min_roster_size
}

/// Non-BENCH positions assigned to more than one player, in enum order.
pub fn duplicate_positions(players: &[Player]) -> Vec<Position> {
    let mut counts: BTreeMap<Position, usize> = BTreeMap::new();
    for position in players.iter().filter_map(|player| player.position) {
        if !position.is_bench() {
            *counts.entry(position).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(position, _)| position)
        .collect()
}

/// Everything the conditions can observe during one run.
#[derive(Debug, Clone, Default)]
pub struct LineupWorld {
    pub state: RunState,
    /// Latest generator result; replaced on every attempt, cleared on failure.
    pub candidate: Option<CandidateLineup>,
    pub lineup: Option<FinalLineup>,
}

impl LineupWorld {
    pub fn holds(&self, condition: Condition, limits: &Limits) -> bool {
        match condition {
            Condition::CallCounterInitialized => self.state.is_initialized(),
            Condition::CanCallGenerator => can_call_generator(&self.state, limits),
            Condition::ValidLineup => self
                .candidate
                .as_ref()
                .is_some_and(|candidate| is_valid_lineup(candidate, limits)),
            Condition::LineupComplete => self.lineup.is_some(),
        }
    }
}
