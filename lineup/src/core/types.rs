//! Shared deterministic types for lineup core logic.
//!
//! These types define stable contracts between the workflow, the generator
//! agent, and the CLI. They must not depend on external state or I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field position a player can be assigned to.
///
/// `Bench` is the only position that may legitimately repeat across players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
    Bench,
}

impl Position {
    /// Every position in declaration order. Prompt rendering relies on this order.
    pub const ALL: [Position; 10] = [
        Position::Pitcher,
        Position::Catcher,
        Position::FirstBase,
        Position::SecondBase,
        Position::ThirdBase,
        Position::Shortstop,
        Position::LeftField,
        Position::CenterField,
        Position::RightField,
        Position::Bench,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Pitcher => "PITCHER",
            Position::Catcher => "CATCHER",
            Position::FirstBase => "FIRST_BASE",
            Position::SecondBase => "SECOND_BASE",
            Position::ThirdBase => "THIRD_BASE",
            Position::Shortstop => "SHORTSTOP",
            Position::LeftField => "LEFT_FIELD",
            Position::CenterField => "CENTER_FIELD",
            Position::RightField => "RIGHT_FIELD",
            Position::Bench => "BENCH",
        }
    }

    pub fn is_bench(self) -> bool {
        self == Position::Bench
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named player and the position the model assigned (if any).
///
/// Identity is the index in the enclosing list; names may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: Option<Position>,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Position label for display, `UNASSIGNED` when the model left it empty.
    pub fn position_label(&self) -> &'static str {
        self.position.map_or("UNASSIGNED", Position::as_str)
    }
}

/// Unvalidated lineup returned by one generator attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLineup {
    pub players: Vec<Player>,
}

/// Accepted lineup, copied verbatim from a validated candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalLineup {
    pub players: Vec<Player>,
}

impl FinalLineup {
    /// Copy the candidate's players in their original order.
    pub(crate) fn accept(candidate: &CandidateLineup) -> Self {
        Self {
            players: candidate.players.clone(),
        }
    }
}

/// Classification attached to a stuck run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    /// The run is terminal; nothing further will be attempted.
    NoResolution,
}

/// Terminal failure report produced when no action can advance the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckResult {
    pub run_id: String,
    pub message: String,
    pub resolution: Resolution,
    /// Model calls consumed before the run got stuck.
    pub call_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&Position::CenterField).expect("serialize");
        assert_eq!(json, "\"CENTER_FIELD\"");
        for position in Position::ALL {
            let json = serde_json::to_string(&position).expect("serialize");
            assert_eq!(json, format!("\"{}\"", position.as_str()));
        }
    }

    #[test]
    fn player_accepts_null_position() {
        let player: Player =
            serde_json::from_str(r#"{"name":"Ivy","position":null}"#).expect("parse");
        assert_eq!(player, Player::new("Ivy", None));
        assert_eq!(player.position_label(), "UNASSIGNED");
    }

    #[test]
    fn final_lineup_copies_players_in_order() {
        let candidate = CandidateLineup {
            players: vec![
                Player::new("Zed", Some(Position::Bench)),
                Player::new("Amy", Some(Position::Pitcher)),
            ],
        };
        let lineup = FinalLineup::accept(&candidate);
        assert_eq!(lineup.players, candidate.players);
    }

    #[test]
    fn resolution_serializes_as_no_resolution() {
        let json = serde_json::to_string(&Resolution::NoResolution).expect("serialize");
        assert_eq!(json, "\"NO_RESOLUTION\"");
    }
}
