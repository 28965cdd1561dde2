//! Baseball lineup generator.
//!
//! Reads a free-text list of player names, asks a model to assign positions,
//! and retries under a bounded call budget until a lineup is accepted.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use lineup::cancel::CancelFlag;
use lineup::core::types::FinalLineup;
use lineup::exit_codes;
use lineup::io::config::{DEFAULT_CONFIG_FILE, LineupConfig, load_config, write_config};
use lineup::io::executor::CodexExecutor;
use lineup::io::prompt::PromptBuilder;
use lineup::logging;
use lineup::validate::{CANDIDATE_LINEUP_SCHEMA, validate_lineup_file};
use lineup::workflow::{LineupWorkflow, RunStop};

#[derive(Parser)]
#[command(
    name = "lineup",
    version,
    about = "Assign baseball positions to players with a budgeted model workflow"
)]
struct Cli {
    /// Path to the TOML config (defaults apply when the file is missing).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a lineup from player names (file or stdin).
    Generate {
        /// Read player names from this file instead of stdin.
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Print the lineup (or stuck report) as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the prompt that would be sent to the model.
    Prompt {
        /// Read player names from this file instead of stdin.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print the JSON schema requested from the model.
    Schema,
    /// Check a lineup JSON file against the schema and roster size.
    Validate {
        /// Lineup JSON file (`{"players": [...]}`).
        file: PathBuf,
    },
    /// Write a default config file.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate { input, json } => cmd_generate(&cli.config, input.as_deref(), json),
        Command::Prompt { input } => cmd_prompt(input.as_deref()),
        Command::Schema => {
            print!("{CANDIDATE_LINEUP_SCHEMA}");
            Ok(exit_codes::OK)
        }
        Command::Validate { file } => cmd_validate(&cli.config, &file),
        Command::Init { force } => cmd_init(&cli.config, force),
    }
}

fn cmd_generate(config_path: &Path, input: Option<&Path>, json: bool) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let roster_text = read_roster(input)?;
    let executor = CodexExecutor::new(&cfg.executor);
    let outcome = LineupWorkflow::new(&executor, &cfg).run(&roster_text, &CancelFlag::new())?;

    match outcome.stop {
        RunStop::Complete(lineup) => {
            if json {
                print_json(&lineup)?;
            } else {
                print_lineup(&lineup);
            }
            Ok(exit_codes::OK)
        }
        RunStop::Stuck(result) => {
            if json {
                print_json(&result)?;
            }
            eprintln!("{}", result.message);
            Ok(exit_codes::STUCK)
        }
        RunStop::Cancelled => {
            eprintln!("run {} cancelled", outcome.run_id);
            Ok(exit_codes::INVALID)
        }
    }
}

fn cmd_prompt(input: Option<&Path>) -> Result<i32> {
    let roster_text = read_roster(input)?;
    let prompt = PromptBuilder::new().build_generator(&roster_text)?;
    println!("{prompt}");
    Ok(exit_codes::OK)
}

fn cmd_validate(config_path: &Path, file: &Path) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let report = validate_lineup_file(file, &cfg.limits())?;
    for position in &report.duplicate_positions {
        eprintln!("warning: {position} is assigned to more than one player");
    }
    if !report.valid {
        eprintln!(
            "invalid lineup: {} players, need at least {}",
            report.players, cfg.min_roster_size
        );
        return Ok(exit_codes::INVALID);
    }
    println!("ok: {} players", report.players);
    Ok(exit_codes::OK)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &LineupConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

/// Read raw roster text from a file or stdin. The text is otherwise opaque.
fn read_roster(input: Option<&Path>) -> Result<String> {
    let text = match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read player names from stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        bail!("no player names given");
    }
    Ok(text)
}

fn print_lineup(lineup: &FinalLineup) {
    for player in &lineup.players {
        println!("{}\t{}", player.name, player.position_label());
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}
