//! Structural and domain validation for lineup JSON.
//!
//! Structural checks use the same JSON Schema that constrains model output;
//! the domain check is the roster-size condition from [`crate::core::conditions`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use jsonschema::Draft;
use serde_json::Value;

use crate::core::conditions::{Limits, duplicate_positions, is_valid_lineup};
use crate::core::types::{CandidateLineup, Position};

/// JSON Schema requested from the model for every generator attempt.
pub const CANDIDATE_LINEUP_SCHEMA: &str = include_str!("../schemas/candidate_lineup.schema.json");

/// Result of checking a lineup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupReport {
    pub players: usize,
    /// Whether the roster-size condition holds.
    pub valid: bool,
    /// Non-BENCH positions assigned more than once (reported, not enforced).
    pub duplicate_positions: Vec<Position>,
}

/// Validate a JSON instance against the candidate schema and deserialize it.
///
/// No repair is attempted: any schema violation is an error.
pub fn parse_candidate(instance: &Value) -> Result<CandidateLineup> {
    let schema: Value =
        serde_json::from_str(CANDIDATE_LINEUP_SCHEMA).context("parse candidate schema")?;
    validate_schema(instance, &schema)?;
    let candidate: CandidateLineup =
        serde_json::from_value(instance.clone()).context("parse candidate lineup")?;
    Ok(candidate)
}

/// Check a lineup file on disk: schema conformance, then the roster-size condition.
pub fn validate_lineup_file(path: &Path, limits: &Limits) -> Result<LineupReport> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let instance: Value =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    let candidate =
        parse_candidate(&instance).with_context(|| format!("validate {}", path.display()))?;
    Ok(LineupReport {
        players: candidate.players.len(),
        valid: is_valid_lineup(&candidate, limits),
        duplicate_positions: duplicate_positions(&candidate.players),
    })
}

/// Validate JSON instance against a JSON Schema (Draft 2020-12).
pub fn validate_schema(instance: &Value, schema: &Value) -> Result<()> {
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .context("compile json schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("schema validation failed:\n- {}", messages.join("\n- "));
    }
    Ok(())
}
