//! Executor abstraction for model invocation.
//!
//! The [`Executor`] trait is the opaque "call the model" capability: given a
//! prompt and an output schema it must leave the model's final JSON message at
//! `request.output_path`. The production backend spawns `codex exec`; tests use
//! scripted executors that write predetermined outputs without spawning processes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelFlag;
use crate::io::config::ExecutorConfig;
use crate::io::process::{CommandOutput, run_command_with_timeout};

/// Parameters for an executor invocation.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Working directory for the executor process.
    pub workdir: PathBuf,
    /// Prompt text to feed to the model.
    pub prompt: String,
    /// Path to the JSON Schema that constrains model output.
    pub output_schema_path: PathBuf,
    /// Path where the model's final message must be written.
    pub output_path: PathBuf,
    /// Path to write executor stdout/stderr log.
    pub executor_log_path: PathBuf,
    /// Maximum time to wait for the executor to complete.
    pub timeout: Duration,
    /// Truncate executor output logs beyond this many bytes.
    pub output_limit_bytes: usize,
    /// Raised when the enclosing run is cancelled.
    pub cancel: CancelFlag,
}

/// Abstraction over model execution backends.
pub trait Executor {
    /// Run the model with the given request. Must write output to `request.output_path`.
    fn exec(&self, request: &ExecRequest) -> Result<()>;
}

/// Executor that spawns `codex exec` with a structured output schema.
#[derive(Debug, Clone)]
pub struct CodexExecutor {
    program: String,
    reasoning_effort: String,
}

impl CodexExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            program: config.program.clone(),
            reasoning_effort: config.reasoning_effort.clone(),
        }
    }
}

impl Executor for CodexExecutor {
    #[instrument(skip_all, fields(program = %self.program, timeout_secs = request.timeout.as_secs()))]
    fn exec(&self, request: &ExecRequest) -> Result<()> {
        info!(workdir = %request.workdir.display(), "starting codex exec");

        if !request.output_schema_path.exists() {
            return Err(anyhow!(
                "missing output schema {}",
                request.output_schema_path.display()
            ));
        }
        if let Some(parent) = request.output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
        let mut cmd = Command::new(&self.program);
        cmd.arg("exec")
            .arg("-c")
            .arg(format!("model_reasoning_effort={}", self.reasoning_effort))
            .arg("--sandbox")
            .arg("read-only")
            // Lineup generation never touches a repository.
            .arg("--skip-git-repo-check")
            .arg("--output-schema")
            .arg(&request.output_schema_path)
            .arg("--output-last-message")
            .arg(&request.output_path)
            .arg("-")
            .current_dir(&request.workdir);

        let output = run_command_with_timeout(
            cmd,
            Some(request.prompt.as_bytes()),
            request.timeout,
            request.output_limit_bytes,
            &request.cancel,
        )
        .context("run codex exec")?;

        write_executor_log(
            &request.executor_log_path,
            &output,
            request.output_limit_bytes,
        )?;

        if output.cancelled {
            warn!("codex exec cancelled");
            return Err(anyhow!("codex exec cancelled"));
        }
        if output.timed_out {
            warn!(
                timeout_secs = request.timeout.as_secs(),
                "codex exec timed out"
            );
            return Err(anyhow!("codex exec timed out after {:?}", request.timeout));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "codex exec failed");
            return Err(anyhow!(
                "codex exec failed with status {:?}",
                output.status.code()
            ));
        }

        debug!("codex exec completed successfully");
        Ok(())
    }
}

/// Execute the model and load its output as JSON of type `T`.
#[instrument(skip_all, fields(output_path = %request.output_path.display()))]
pub fn execute_and_load_json<E: Executor, T: DeserializeOwned>(
    executor: &E,
    request: &ExecRequest,
) -> Result<T> {
    executor.exec(request)?;
    ensure_output_exists(&request.output_path)?;
    read_output_json(&request.output_path)
}

fn ensure_output_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("missing model output {}", path.display()));
    }
    Ok(())
}

fn read_output_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read model output {}", path.display()))?;
    let value =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

fn write_executor_log(path: &Path, output: &CommandOutput, output_limit: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create executor log dir {}", parent.display()))?;
    }
    let mut buf = String::new();
    buf.push_str("=== stdout ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stdout));
    buf.push_str(&output.stdout_truncated_notice("executor"));
    buf.push_str("\n=== stderr ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stderr));
    buf.push_str(&output.stderr_truncated_notice("executor"));
    if output.timed_out {
        buf.push_str("\n[executor timed out]\n");
    }
    if output.cancelled {
        buf.push_str("\n[executor cancelled]\n");
    }

    if buf.len() > output_limit {
        let cut = floor_char_boundary(&buf, output_limit);
        let truncated = format!("{}\n[truncated {} bytes]\n", &buf[..cut], buf.len() - cut);
        fs::write(path, truncated)
            .with_context(|| format!("write executor log {}", path.display()))?;
        return Ok(());
    }

    fs::write(path, buf).with_context(|| format!("write executor log {}", path.display()))
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut cut = index.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    struct FakeExecutor {
        output: Option<&'static str>,
    }

    impl Executor for FakeExecutor {
        fn exec(&self, request: &ExecRequest) -> Result<()> {
            if let Some(output) = self.output {
                fs::write(&request.output_path, output)?;
            }
            Ok(())
        }
    }

    fn request(dir: &Path) -> ExecRequest {
        ExecRequest {
            workdir: dir.to_path_buf(),
            prompt: "prompt".to_string(),
            output_schema_path: dir.join("schema.json"),
            output_path: dir.join("output.json"),
            executor_log_path: dir.join("executor.log"),
            timeout: Duration::from_secs(1),
            output_limit_bytes: 1000,
            cancel: CancelFlag::new(),
        }
    }

    /// Verifies execute_and_load_json parses whatever the executor wrote.
    #[test]
    fn execute_and_load_reads_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let fake = FakeExecutor {
            output: Some(r#"{"players":[]}"#),
        };

        let output: Value = execute_and_load_json(&fake, &request(temp.path())).expect("load");
        assert_eq!(output["players"], Value::Array(Vec::new()));
    }

    /// Verifies execute_and_load_json fails when the output file is missing.
    #[test]
    fn execute_and_load_errors_on_missing_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let fake = FakeExecutor { output: None };

        let err = execute_and_load_json::<_, Value>(&fake, &request(temp.path())).unwrap_err();
        assert!(err.to_string().contains("missing model output"));
    }

    #[test]
    fn execute_and_load_errors_on_malformed_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let fake = FakeExecutor {
            output: Some("not json"),
        };

        let err = execute_and_load_json::<_, Value>(&fake, &request(temp.path())).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn codex_executor_requires_schema() {
        let temp = tempfile::tempdir().expect("tempdir");
        let executor = CodexExecutor::new(&ExecutorConfig::default());
        let err = executor.exec(&request(temp.path())).unwrap_err();
        assert!(err.to_string().contains("missing output schema"));
    }

    #[test]
    fn codex_executor_reports_missing_program() {
        let temp = tempfile::tempdir().expect("tempdir");
        let req = request(temp.path());
        fs::write(&req.output_schema_path, "{}").expect("schema");
        let executor = CodexExecutor::new(&ExecutorConfig {
            program: "lineup-test-missing-model-cli".to_string(),
            ..ExecutorConfig::default()
        });

        let err = executor.exec(&req).unwrap_err();
        assert!(format!("{err:#}").contains("spawn command"));
        assert!(!req.output_path.exists());
    }

    #[test]
    fn executor_log_truncates_on_char_boundary() {
        assert_eq!(floor_char_boundary("Jos\u{e9}", 4), 3);
        assert_eq!(floor_char_boundary("abc", 10), 3);
    }
}
