//! Per-attempt diagnostics under `<work_dir>/runs/<run_id>/<attempt>/`.
//!
//! These files exist for debugging model behavior; nothing reads them back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::types::Position;

/// How a single generator attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    /// A candidate was produced and satisfies the validity condition.
    Valid,
    /// A candidate was produced but was rejected.
    Invalid,
    /// No candidate was produced (transport, timeout, or malformed output).
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptMeta {
    pub run_id: String,
    pub attempt: u32,
    pub call_count: u32,
    pub outcome: AttemptOutcome,
    pub players: Option<usize>,
    pub duplicate_positions: Vec<Position>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct RunPaths {
    pub dir: PathBuf,
    pub schema_path: PathBuf,
}

impl RunPaths {
    pub fn new(work_dir: &Path, run_id: &str) -> Self {
        let dir = work_dir.join("runs").join(run_id);
        Self {
            schema_path: dir.join("candidate_lineup.schema.json"),
            dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttemptPaths {
    pub dir: PathBuf,
    pub prompt_path: PathBuf,
    pub output_path: PathBuf,
    pub executor_log_path: PathBuf,
    pub meta_path: PathBuf,
}

impl AttemptPaths {
    pub fn new(run: &RunPaths, attempt: u32) -> Self {
        let dir = run.dir.join(attempt.to_string());
        Self {
            prompt_path: dir.join("prompt.md"),
            output_path: dir.join("output.json"),
            executor_log_path: dir.join("executor.log"),
            meta_path: dir.join("meta.json"),
            dir,
        }
    }

    /// Create the attempt directory and record the prompt before the model runs.
    pub fn prepare(&self, prompt: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create attempt dir {}", self.dir.display()))?;
        write_text(&self.prompt_path, prompt)
    }
}

pub fn write_attempt_meta(paths: &AttemptPaths, meta: &AttemptMeta) -> Result<()> {
    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("create attempt dir {}", paths.dir.display()))?;
    write_json(&paths.meta_path, meta)
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value)?;
    buf.push('\n');
    write_text(path, &buf)
}
