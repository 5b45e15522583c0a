//! Concord - decision reconciliation CLI
//!
//! The `concord` command reconciles decisions from multiple producers and
//! emits a human-review request when they fundamentally disagree.
//!
//! ## Commands
//!
//! - `evaluate`: Analyze, resolve and apply the escalation contract
//! - `analyze`: Print the alignment summary only, optionally asserting its state
//! - `check-request`: Validate a serialized HITL request
//! - `semantics`: Print the escalation contract semantics
//! - `config`: Print the effective configuration

mod config;
mod input;
mod telemetry;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use concord_core::obs::{
    emit_contract_violation, emit_decision_points, emit_escalation, EvaluationSpan,
};
use concord_core::{
    analyze, escalation_semantics, evaluate, validate_hitl_request, AlignmentState,
    AlignmentSummary, Evaluation, HitlRequest,
};

use config::ConcordConfig;
use input::EvaluationInput;

/// Exit status when `--fail-on-escalation` is set and a request was produced.
const ESCALATION_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "concord")]
#[command(version = concord_core::VERSION)]
#[command(about = "Deterministic decision reconciliation with HITL escalation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "CONCORD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the decisions in an input file
    Evaluate {
        /// Input file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Logical timestamp for an escalation request (RFC 3339)
        #[arg(long)]
        created_at: Option<DateTime<Utc>>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with status 2 when human review is requested
        #[arg(long)]
        fail_on_escalation: bool,
    },

    /// Print the alignment summary for an input file
    Analyze {
        /// Input file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Fail unless the alignment state matches (e.g. full_alignment)
        #[arg(long, value_parser = parse_state)]
        expect_state: Option<AlignmentState>,
    },

    /// Validate a serialized HITL request
    CheckRequest {
        /// Request file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the escalation contract semantics
    Semantics,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConcordConfig::load(cli.config.as_deref())?;
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    telemetry::init_tracing(cli.json || config.logging.json, level);

    match cli.command {
        Commands::Evaluate {
            input,
            created_at,
            output,
            fail_on_escalation,
        } => {
            let escalated = cmd_evaluate(&config, &input, created_at, output.as_deref())?;
            if fail_on_escalation && escalated {
                return Ok(ExitCode::from(ESCALATION_EXIT_CODE));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze {
            input,
            expect_state,
        } => {
            let summary = cmd_analyze(&config, &input)?;
            check_expected_state(&summary, expect_state)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckRequest { input } => cmd_check_request(&input).map(|_| ExitCode::SUCCESS),
        Commands::Semantics => print_json(&escalation_semantics()).map(|_| ExitCode::SUCCESS),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Returns `true` when the evaluation produced a HITL request.
fn cmd_evaluate(
    config: &ConcordConfig,
    input: &Path,
    created_at: Option<DateTime<Utc>>,
    output: Option<&Path>,
) -> Result<bool> {
    let evaluation = run_evaluation(config, input, created_at)?;

    let report = serde_json::to_string_pretty(&evaluation)?;
    if let Some(path) = output {
        std::fs::write(path, &report)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!(path = ?path, "report written");
    } else {
        println!("{}", report);
    }

    Ok(evaluation.escalated())
}

/// Load, evaluate and observe one input file.
fn run_evaluation(
    config: &ConcordConfig,
    path: &Path,
    created_at: Option<DateTime<Utc>>,
) -> Result<Evaluation> {
    let input = EvaluationInput::read(path)?;
    let thresholds = config.thresholds()?;
    let decisions = input.decisions()?;
    let context = input.escalation_context(created_at, || {
        debug!("no created_at supplied, using current time");
        Utc::now()
    });

    let _span = EvaluationSpan::enter(&input.task_id);
    let evaluation = evaluate(
        &input.task_id,
        &decisions,
        &input.schema,
        &thresholds,
        &context,
    )
    .with_context(|| format!("Evaluation failed for task {}", input.task_id))?;

    emit_decision_points(&evaluation.decision_points);
    if let Some(request) = &evaluation.hitl_request {
        emit_escalation(request);
    }
    Ok(evaluation)
}

fn cmd_analyze(config: &ConcordConfig, path: &Path) -> Result<AlignmentSummary> {
    let input = EvaluationInput::read(path)?;
    let thresholds = config.thresholds()?;
    let decisions = input.decisions()?;

    let _span = EvaluationSpan::enter(&input.task_id);
    let summary = analyze(&decisions, &input.schema, &thresholds)
        .with_context(|| format!("Analysis failed for task {}", input.task_id))?;
    print_json(&summary)?;
    Ok(summary)
}

fn parse_state(s: &str) -> std::result::Result<AlignmentState, String> {
    AlignmentState::parse(s).ok_or_else(|| {
        format!(
            "unknown alignment state {s:?}; expected one of full_alignment, \
             soft_disagreement, hard_disagreement, insufficient_signal"
        )
    })
}

fn check_expected_state(summary: &AlignmentSummary, expected: Option<AlignmentState>) -> Result<()> {
    match expected {
        Some(state) if state != summary.state => {
            bail!("Expected alignment state {state}, got {}", summary.state)
        }
        _ => Ok(()),
    }
}

fn cmd_check_request(path: &Path) -> Result<HitlRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {:?}", path))?;
    let request: HitlRequest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid HITL request JSON in {:?}", path))?;

    if let Err(e) = validate_hitl_request(&request) {
        emit_contract_violation(&request.request_id, &e);
        return Err(e).context(format!("Request {} failed validation", request.request_id));
    }

    println!("✓ {} is a valid HITL request", request.request_id);
    Ok(request)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
