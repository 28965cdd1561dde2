//! Test-only helpers: lineup fixtures and a scripted executor.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{CandidateLineup, Player, Position};
use crate::io::config::LineupConfig;
use crate::io::executor::{ExecRequest, Executor};

/// `n` players named `Player 1..n`; the first nine get distinct field positions,
/// the rest are on the bench.
pub fn players(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| {
            let position = Position::ALL[i.min(Position::ALL.len() - 1)];
            Player::new(format!("Player {}", i + 1), Some(position))
        })
        .collect()
}

pub fn candidate_with(n: usize) -> CandidateLineup {
    CandidateLineup {
        players: players(n),
    }
}

/// Candidate using the given names, positions assigned as in [`players`].
pub fn named_candidate(names: &[&str]) -> CandidateLineup {
    let players = names
        .iter()
        .zip(players(names.len()))
        .map(|(name, player)| Player::new(*name, player.position))
        .collect();
    CandidateLineup { players }
}

/// One scripted executor response.
#[derive(Debug, Clone)]
pub enum ScriptedOutput {
    /// Write this candidate as the model's output.
    Lineup(CandidateLineup),
    /// Write this text verbatim (useful for malformed output).
    Raw(String),
    /// Succeed without writing any output.
    Missing,
    /// Fail like a transport error.
    Fail(String),
    /// Raise the request's cancel flag, then fail.
    CancelRun,
    /// Block for this long, then fail like a model that never answered.
    Sleep(Duration),
}

/// Executor that replays scripted outputs in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    script: RefCell<VecDeque<ScriptedOutput>>,
    requests: RefCell<Vec<ExecRequest>>,
}

impl ScriptedExecutor {
    pub fn new(script: Vec<ScriptedOutput>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Scripted lineups, one per call.
    pub fn lineups(lineups: Vec<CandidateLineup>) -> Self {
        Self::new(lineups.into_iter().map(ScriptedOutput::Lineup).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<ExecRequest> {
        self.requests.borrow().clone()
    }
}

impl Executor for ScriptedExecutor {
    fn exec(&self, request: &ExecRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        let next = self
            .script
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted executor exhausted"))?;
        match next {
            ScriptedOutput::Lineup(lineup) => {
                let mut buf = serde_json::to_string_pretty(&lineup)?;
                buf.push('\n');
                write_output(&request.output_path, &buf)
            }
            ScriptedOutput::Raw(raw) => write_output(&request.output_path, &raw),
            ScriptedOutput::Missing => Ok(()),
            ScriptedOutput::Fail(message) => Err(anyhow!(message)),
            ScriptedOutput::CancelRun => {
                request.cancel.cancel();
                Err(anyhow!("scripted executor cancelled"))
            }
            ScriptedOutput::Sleep(duration) => {
                thread::sleep(duration);
                Err(anyhow!("scripted executor slept {duration:?}"))
            }
        }
    }
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Temporary work directory with a config pointing into it.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default config with diagnostics written under the temp dir.
    pub fn config(&self) -> LineupConfig {
        LineupConfig {
            work_dir: self.path().join(".lineup"),
            ..LineupConfig::default()
        }
    }
}
