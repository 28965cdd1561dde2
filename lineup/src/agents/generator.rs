//! Generator agent: one model call that proposes a candidate lineup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::cancel::CancelFlag;
use crate::core::types::CandidateLineup;
use crate::io::attempt_log::AttemptPaths;
use crate::io::executor::{ExecRequest, Executor, execute_and_load_json};
use crate::io::prompt::PromptBuilder;
use crate::validate::{CANDIDATE_LINEUP_SCHEMA, parse_candidate};

use super::write_output_schema;

/// Generator agent wrapper that owns schema and output settings.
#[derive(Debug, Clone)]
pub struct GeneratorAgent {
    schema_path: PathBuf,
    output_limit_bytes: usize,
}

impl GeneratorAgent {
    pub fn new(schema_path: PathBuf, output_limit_bytes: usize) -> Self {
        Self {
            schema_path,
            output_limit_bytes,
        }
    }

    /// Ask the model for a lineup and return it unmodified.
    ///
    /// The result is structurally checked against the candidate schema but is
    /// not repaired or validated for roster size.
    pub fn run<E: Executor>(
        &self,
        executor: &E,
        workdir: &Path,
        paths: &AttemptPaths,
        roster_text: &str,
        timeout: Duration,
        cancel: &CancelFlag,
    ) -> Result<CandidateLineup> {
        write_output_schema(&self.schema_path, CANDIDATE_LINEUP_SCHEMA)?;

        let prompt = PromptBuilder::new().build_generator(roster_text)?;
        paths.prepare(&prompt)?;

        let request = ExecRequest {
            workdir: workdir.to_path_buf(),
            prompt,
            output_schema_path: self.schema_path.clone(),
            output_path: paths.output_path.clone(),
            executor_log_path: paths.executor_log_path.clone(),
            timeout,
            output_limit_bytes: self.output_limit_bytes,
            cancel: cancel.clone(),
        };

        let raw: Value = execute_and_load_json(executor, &request)?;
        let candidate = parse_candidate(&raw)?;
        debug!(players = candidate.players.len(), "parsed candidate lineup");
        Ok(candidate)
    }
}
