//! CLI argument parsing for the verification harness.
use crate::config::DEFAULT_TEST_DATA;
use crate::harness::DEFAULT_MAX_RETRIES;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "rharness",
    version,
    about = "Contract-checked scenario runner for a repository REST API",
    after_help = "Environment:\n  GITHUB_API_BASE_URI  API root (default https://api.github.com)\n  GITHUB_TOKEN         Bearer token used for every request (required by run)\n  RUST_LOG             Log filter (default repo_harness=info,rharness=info)\n\nExamples:\n  rharness plan\n  rharness run --report /tmp/report.json\n  rharness run --only get-repository list-branches --verbose",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Plan(PlanArgs),
}

/// Run command inputs.
#[derive(Parser, Debug)]
#[command(about = "Execute scenarios against the API and report verdicts")]
pub struct RunArgs {
    /// Test data JSON naming the target repository and expected values
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TEST_DATA)]
    pub test_data: PathBuf,

    /// Additional attempts after a retryable failure
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Retry contract violations as well as transport failures
    #[arg(long)]
    pub retry_contract_violations: bool,

    /// Enable scenarios that delete the target repository
    #[arg(long)]
    pub include_destructive: bool,

    /// Run only the named scenarios; the rest are reported not_run
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub only: Vec<String>,

    /// Write the JSON run report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Log every HTTP exchange
    #[arg(long)]
    pub verbose: bool,
}

/// Plan command inputs.
#[derive(Parser, Debug)]
#[command(about = "Print the resolved scenario schedule without sending requests")]
pub struct PlanArgs {
    /// Test data JSON naming the target repository and expected values
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TEST_DATA)]
    pub test_data: PathBuf,

    /// Include scenarios that delete the target repository
    #[arg(long)]
    pub include_destructive: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
