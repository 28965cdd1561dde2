//! Lineup configuration stored in `lineup.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::conditions::{DEFAULT_MAX_CALLS, DEFAULT_MIN_ROSTER_SIZE, Limits};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lineup.toml";

/// Lineup configuration (TOML).
///
/// Missing fields default to the reference behavior (at most four model calls,
/// at least nine players).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LineupConfig {
    /// Budget ceiling: a model call is admitted while `call_count <= max_calls`.
    pub max_calls: u32,

    /// Minimum number of players for a candidate to be accepted.
    pub min_roster_size: usize,

    /// Per-call model timeout in seconds.
    pub model_timeout_secs: u64,

    /// Wall-clock budget for the whole run in seconds.
    pub run_timeout_secs: u64,

    /// Truncate captured model stdout/stderr beyond this many bytes.
    pub executor_output_limit_bytes: usize,

    /// Directory for per-attempt diagnostics.
    pub work_dir: PathBuf,

    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Model CLI to spawn (must accept `codex exec` arguments).
    pub program: String,
    /// Passed through as `-c model_reasoning_effort=<value>`.
    pub reasoning_effort: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: "codex".to_string(),
            reasoning_effort: "medium".to_string(),
        }
    }
}

impl Default for LineupConfig {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            min_roster_size: DEFAULT_MIN_ROSTER_SIZE,
            model_timeout_secs: 5 * 60,
            run_timeout_secs: 30 * 60,
            executor_output_limit_bytes: 100_000,
            work_dir: PathBuf::from(".lineup"),
            executor: ExecutorConfig::default(),
        }
    }
}

impl LineupConfig {
    pub fn validate(&self) -> Result<()> {
        // The call counter must be able to exceed the ceiling.
        if self.max_calls == u32::MAX {
            return Err(anyhow!("max_calls must be < {}", u32::MAX));
        }
        if self.min_roster_size == 0 {
            return Err(anyhow!("min_roster_size must be > 0"));
        }
        if self.model_timeout_secs == 0 {
            return Err(anyhow!("model_timeout_secs must be > 0"));
        }
        if self.run_timeout_secs == 0 {
            return Err(anyhow!("run_timeout_secs must be > 0"));
        }
        if self.executor_output_limit_bytes == 0 {
            return Err(anyhow!("executor_output_limit_bytes must be > 0"));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(anyhow!("work_dir must be non-empty"));
        }
        if self.executor.program.trim().is_empty() {
            return Err(anyhow!("executor.program must be non-empty"));
        }
        if self.executor.reasoning_effort.trim().is_empty() {
            return Err(anyhow!("executor.reasoning_effort must be non-empty"));
        }
        Ok(())
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_calls: self.max_calls,
            min_roster_size: self.min_roster_size,
        }
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LineupConfig::default()`.
pub fn load_config(path: &Path) -> Result<LineupConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = LineupConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LineupConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &LineupConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, LineupConfig::default());
        assert_eq!(cfg.limits(), Limits::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("lineup.toml");
        let cfg = LineupConfig {
            max_calls: 1,
            min_roster_size: 11,
            ..LineupConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("lineup.toml");
        fs::write(&path, "max_calls = 0\n[executor]\nprogram = \"my-codex\"\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.max_calls, 0);
        assert_eq!(cfg.min_roster_size, DEFAULT_MIN_ROSTER_SIZE);
        assert_eq!(cfg.executor.program, "my-codex");
        assert_eq!(cfg.executor.reasoning_effort, "medium");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("lineup.toml");
        fs::write(&path, "model_timeout_secs = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("model_timeout_secs must be > 0"));
    }

    #[test]
    fn unbounded_call_ceiling_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("lineup.toml");
        fs::write(&path, format!("max_calls = {}\n", u32::MAX)).expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_calls must be <"));

        let cfg = LineupConfig {
            max_calls: u32::MAX - 1,
            ..LineupConfig::default()
        };
        cfg.validate().expect("largest finite ceiling");
    }
}
