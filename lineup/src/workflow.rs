//! Goal-directed lineup workflow.
//!
//! The workflow is a small action graph ([`LINEUP_ACTIONS`]) driven to a fixed
//! point: each step asks [`select_action`] for the first eligible action, runs
//! it, and repeats until the goal holds (success) or nothing is eligible
//! (stuck). The model call is the only expensive action and is admitted by the
//! call budget.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::agents::generator::GeneratorAgent;
use crate::cancel::CancelFlag;
use crate::core::budget::call_timeout;
use crate::core::conditions::{
    Condition, Limits, LineupWorld, can_call_generator, duplicate_positions, is_valid_lineup,
};
use crate::core::graph::{ActionSpec, Selection, select_action};
use crate::core::stuck::handle_stuck;
use crate::core::types::{FinalLineup, StuckResult};
use crate::io::attempt_log::{
    AttemptMeta, AttemptOutcome, AttemptPaths, RunPaths, write_attempt_meta,
};
use crate::io::config::LineupConfig;
use crate::io::executor::Executor;

/// Condition whose satisfaction ends the run successfully.
pub const GOAL: Condition = Condition::LineupComplete;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineupAction {
    CheckEligibility,
    GeneratePotentialLineup,
    CompleteLineup,
}

impl LineupAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LineupAction::CheckEligibility => "check_eligibility",
            LineupAction::GeneratePotentialLineup => "generate_potential_lineup",
            LineupAction::CompleteLineup => "complete_lineup",
        }
    }
}

impl fmt::Display for LineupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action table, scanned in order on every step.
pub const LINEUP_ACTIONS: [ActionSpec<LineupAction, Condition>; 3] = [
    ActionSpec {
        id: LineupAction::CheckEligibility,
        pre: &[],
        post: &[Condition::CallCounterInitialized],
        rerunnable: false,
    },
    ActionSpec {
        id: LineupAction::GeneratePotentialLineup,
        pre: &[
            Condition::CallCounterInitialized,
            Condition::CanCallGenerator,
        ],
        post: &[Condition::ValidLineup],
        rerunnable: true,
    },
    ActionSpec {
        id: LineupAction::CompleteLineup,
        pre: &[Condition::ValidLineup],
        post: &[Condition::LineupComplete],
        rerunnable: false,
    },
];

/// Reason why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStop {
    /// The goal holds: a validated candidate was accepted.
    Complete(FinalLineup),
    /// No action could make progress (budget exhausted without a valid candidate).
    Stuck(StuckResult),
    /// The enclosing run was cancelled; no further actions were scheduled.
    Cancelled,
}

/// Summary of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub run_id: String,
    /// Model calls consumed, including failed ones.
    pub call_count: u32,
    /// Executed actions in order.
    pub actions: Vec<LineupAction>,
    pub stop: RunStop,
}

/// Initialize the call counter if it is absent. Safe to invoke repeatedly.
pub fn check_eligibility(world: &mut LineupWorld) {
    if world.state.initialize() {
        debug!("call counter initialized");
    }
}

/// Accept the current candidate as the final lineup.
///
/// Errors if the candidate is missing or fails the validity condition.
pub fn complete_lineup(world: &mut LineupWorld, limits: &Limits) -> Result<()> {
    let candidate = world
        .candidate
        .as_ref()
        .filter(|candidate| is_valid_lineup(candidate, limits))
        .ok_or_else(|| anyhow!("complete_lineup requires a valid candidate"))?;
    world.lineup = Some(FinalLineup::accept(candidate));
    Ok(())
}

/// Lineup workflow bound to a model executor.
pub struct LineupWorkflow<'a, E> {
    executor: &'a E,
    limits: Limits,
    model_timeout: Duration,
    run_timeout: Duration,
    output_limit_bytes: usize,
    work_dir: PathBuf,
}

impl<'a, E: Executor> LineupWorkflow<'a, E> {
    pub fn new(executor: &'a E, config: &LineupConfig) -> Self {
        Self {
            executor,
            limits: config.limits(),
            model_timeout: config.model_timeout(),
            run_timeout: config.run_timeout(),
            output_limit_bytes: config.executor_output_limit_bytes,
            work_dir: config.work_dir.clone(),
        }
    }

    /// Run the workflow under a freshly generated run id.
    pub fn run(&self, roster_text: &str, cancel: &CancelFlag) -> Result<RunOutcome> {
        self.run_with_id(&generate_run_id(), roster_text, cancel)
    }

    /// Drive the action graph until success, stuck, or cancellation.
    ///
    /// Recoverable problems (model failures, malformed or short lineups) never
    /// surface as errors; only diagnostics I/O failures and a runaway action
    /// table do.
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub fn run_with_id(
        &self,
        run_id: &str,
        roster_text: &str,
        cancel: &CancelFlag,
    ) -> Result<RunOutcome> {
        let deadline = Instant::now() + self.run_timeout;
        // The executor runs inside the attempt dir, so every path it is handed must be absolute.
        let work_dir = std::path::absolute(&self.work_dir)
            .with_context(|| format!("resolve work dir {}", self.work_dir.display()))?;
        let run = RunPaths::new(&work_dir, run_id);
        let generator = GeneratorAgent::new(run.schema_path.clone(), self.output_limit_bytes);
        let mut world = LineupWorld::default();
        let mut executed: Vec<LineupAction> = Vec::new();
        let max_steps = step_ceiling(&self.limits);

        info!(
            max_calls = self.limits.max_calls,
            min_roster_size = self.limits.min_roster_size,
            "starting lineup run"
        );

        loop {
            if cancel.is_cancelled() {
                info!("run cancelled");
                return Ok(finish(run_id, &world, executed, RunStop::Cancelled));
            }
            if executed.len() >= max_steps {
                bail!("run {run_id} exceeded {max_steps} workflow steps");
            }

            let selection = select_action(&LINEUP_ACTIONS, GOAL, &executed, |condition| {
                world.holds(condition, &self.limits)
            });
            let action = match selection {
                Selection::GoalReached => {
                    let lineup = world
                        .lineup
                        .clone()
                        .ok_or_else(|| anyhow!("goal reached without a final lineup"))?;
                    info!(players = lineup.players.len(), "lineup complete");
                    return Ok(finish(run_id, &world, executed, RunStop::Complete(lineup)));
                }
                Selection::Stuck => {
                    let call_count = world.state.call_count().unwrap_or(0);
                    warn!(call_count, "no eligible action; run is stuck");
                    let result = handle_stuck(run_id, call_count);
                    return Ok(finish(run_id, &world, executed, RunStop::Stuck(result)));
                }
                Selection::Run(action) => action,
            };

            debug!(%action, "running action");
            match action {
                LineupAction::CheckEligibility => check_eligibility(&mut world),
                LineupAction::GeneratePotentialLineup => self.generate_potential_lineup(
                    &mut world,
                    run_id,
                    &run,
                    &generator,
                    roster_text,
                    deadline,
                    cancel,
                )?,
                LineupAction::CompleteLineup => complete_lineup(&mut world, &self.limits)?,
            }
            executed.push(action);
        }
    }

    /// Spend one model call and replace the current candidate with its result.
    #[allow(clippy::too_many_arguments)]
    fn generate_potential_lineup(
        &self,
        world: &mut LineupWorld,
        run_id: &str,
        run: &RunPaths,
        generator: &GeneratorAgent,
        roster_text: &str,
        deadline: Instant,
        cancel: &CancelFlag,
    ) -> Result<()> {
        // Counted before the call so failures still consume budget.
        let attempt = world.state.record_call();
        world.candidate = None;

        let paths = AttemptPaths::new(run, attempt);
        let started = Instant::now();
        let result = call_timeout(deadline, self.model_timeout).and_then(|timeout| {
            generator.run(
                self.executor,
                &paths.dir,
                &paths,
                roster_text,
                timeout,
                cancel,
            )
        });

        let mut meta = AttemptMeta {
            run_id: run_id.to_string(),
            attempt,
            call_count: attempt,
            outcome: AttemptOutcome::Failed,
            players: None,
            duplicate_positions: Vec::new(),
            error: None,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        match result {
            Ok(candidate) => {
                let players = candidate.players.len();
                let duplicates = duplicate_positions(&candidate.players);
                if !duplicates.is_empty() {
                    warn!(attempt, ?duplicates, "candidate repeats non-bench positions");
                }
                if is_valid_lineup(&candidate, &self.limits) {
                    info!(attempt, players, "candidate accepted");
                    meta.outcome = AttemptOutcome::Valid;
                } else {
                    warn!(
                        attempt,
                        players,
                        min_roster_size = self.limits.min_roster_size,
                        "candidate rejected: too few players"
                    );
                    meta.outcome = AttemptOutcome::Invalid;
                }
                meta.players = Some(players);
                meta.duplicate_positions = duplicates;
                world.candidate = Some(candidate);
            }
            Err(err) => {
                let error = format!("{err:#}");
                warn!(attempt, error = %error, "generator attempt failed");
                meta.error = Some(error);
            }
        }

        write_attempt_meta(&paths, &meta)?;

        if meta.outcome != AttemptOutcome::Valid && !can_call_generator(&world.state, &self.limits)
        {
            info!(call_count = attempt, "call budget exhausted");
        }
        Ok(())
    }
}

/// Most steps a run can legitimately take: every action once, plus every
/// admitted generator retry.
fn step_ceiling(limits: &Limits) -> usize {
    LINEUP_ACTIONS.len() + limits.max_calls as usize + 1
}

fn finish(
    run_id: &str,
    world: &LineupWorld,
    actions: Vec<LineupAction>,
    stop: RunStop,
) -> RunOutcome {
    RunOutcome {
        run_id: run_id.to_string(),
        call_count: world.state.call_count().unwrap_or(0),
        actions,
        stop,
    }
}

/// `lineup_<UTC timestamp>_<6 random lowercase alphanumerics>`.
pub fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let mut rng = rand::thread_rng();
    let short_id = std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(6)
        .collect::<String>()
        .to_lowercase();
    format!("lineup_{timestamp}_{short_id}")
}
