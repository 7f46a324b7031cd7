use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repo_harness::catalog::{self, ApiContext};
use repo_harness::cli::{Command, PlanArgs, RootArgs, RunArgs};
use repo_harness::config::{load_test_data, ApiSettings};
use repo_harness::harness::{ConsoleSink, Orchestrator, Plan, RetryPolicy, UreqTransport};
use repo_harness::util;

const DEFAULT_LOG_FILTER: &str = "repo_harness=info,rharness=info";
const VERBOSE_LOG_FILTER: &str = "repo_harness=debug,rharness=debug";
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    let verbose = matches!(&args.command, Command::Run(run) if run.verbose);
    init_tracing(verbose);

    let result = match args.command {
        Command::Run(args) => cmd_run(args),
        Command::Plan(args) => cmd_plan(args).map(|()| ExitCode::SUCCESS),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_plan(test_data: &Path, settings: ApiSettings, include_destructive: bool) -> Result<(ApiContext, Plan)> {
    let data = load_test_data(test_data)?;
    let ctx = ApiContext {
        settings,
        data,
        created_repo_name: format!("test-repo-{}", util::now_epoch_ms()),
        include_destructive,
    };
    let plan = Plan::new(catalog::scenarios(&ctx)).context("wire scenario plan")?;
    Ok((ctx, plan))
}

fn cmd_run(args: RunArgs) -> Result<ExitCode> {
    let settings = ApiSettings::from_env();
    settings.require_token()?;
    let (ctx, plan) = build_plan(&args.test_data, settings, args.include_destructive)?;
    if let Some(unknown) = args.only.iter().find(|name| plan.get(name).is_none()) {
        return Err(anyhow!("--only names unknown scenario {unknown:?}"));
    }

    let retry = RetryPolicy {
        max_retries: args.max_retries,
        retry_contract_violations: args.retry_contract_violations,
    };
    let mut orchestrator =
        Orchestrator::new(UreqTransport::new(Duration::from_secs(args.timeout_secs)), retry);
    if !args.only.is_empty() {
        orchestrator = orchestrator.only(args.only.iter().cloned());
    }
    tracing::info!(
        base_url = %ctx.settings.base_url,
        owner = %ctx.data.owner,
        repo = %ctx.data.repo,
        scenarios = plan.len(),
        "starting run"
    );

    let stdout = std::io::stdout();
    let mut sink = ConsoleSink::new(stdout.lock());
    let report = orchestrator.run(&plan, &mut sink);
    let mut out = sink.into_inner();
    writeln!(
        out,
        "\n{} passed, {} failed, {} skipped, {} not run",
        report.counts.pass, report.counts.fail, report.counts.skipped, report.counts.not_run
    )
    .context("write run summary")?;

    if let Some(path) = &args.report {
        write_json(path, &report).with_context(|| format!("write report {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[derive(Serialize)]
struct PlanEntry<'a> {
    name: &'a str,
    priority: i32,
    requires: &'a [String],
    produces: Vec<&'a str>,
    paginated: bool,
    enabled: bool,
}

fn cmd_plan(args: PlanArgs) -> Result<()> {
    let (_, plan) = build_plan(&args.test_data, ApiSettings::from_env(), args.include_destructive)?;
    let entries: Vec<PlanEntry<'_>> = plan
        .order()
        .map(|scenario| PlanEntry {
            name: &scenario.name,
            priority: scenario.priority,
            requires: &scenario.requires,
            produces: scenario.outputs.iter().map(|output| output.key.as_str()).collect(),
            paginated: scenario.is_paginated(),
            enabled: scenario.enabled,
        })
        .collect();

    if args.json {
        let text = serde_json::to_string_pretty(&entries).context("serialize plan")?;
        println!("{text}");
        return Ok(());
    }
    for (idx, entry) in entries.iter().enumerate() {
        let mut line = format!("{:>2}. {} (priority {})", idx + 1, entry.name, entry.priority);
        if !entry.requires.is_empty() {
            line.push_str(&format!(" after {}", entry.requires.join(", ")));
        }
        if !entry.enabled {
            line.push_str(" [disabled]");
        }
        println!("{line}");
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
