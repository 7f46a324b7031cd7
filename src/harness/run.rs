//! Sequential execution of a validated plan.
use super::contract::Verdict;
use super::error::HarnessError;
use super::pagination::fetch_all_pages;
use super::report::{EntryStatus, ReportEntry, ReportSink, RunReport};
use super::retry::RetryPolicy;
use super::scenario::{Scenario, ScenarioBody, ScenarioSuccess};
use super::schedule::Plan;
use super::state::{SharedState, StateView};
use super::transport::Transport;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Runs scenarios one at a time and owns every cross-scenario value.
pub struct Orchestrator<T: Transport> {
    transport: T,
    retry: RetryPolicy,
    only: Option<BTreeSet<String>>,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Orchestrator {
            transport,
            retry,
            only: None,
        }
    }

    /// Restrict execution to `names`; everything else is reported `not_run`.
    pub fn only(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.only = Some(names.into_iter().collect());
        self
    }

    pub fn run(&self, plan: &Plan, sink: &mut dyn ReportSink) -> RunReport {
        let mut state = SharedState::new();
        let mut statuses: BTreeMap<&str, EntryStatus> = BTreeMap::new();
        let mut report = RunReport::default();
        for scenario in plan.order() {
            let entry = self.run_scenario(scenario, &statuses, &mut state);
            statuses.insert(scenario.name.as_str(), entry.status);
            sink.record(&entry);
            report.push(entry);
        }
        tracing::info!(
            pass = report.counts.pass,
            fail = report.counts.fail,
            skipped = report.counts.skipped,
            not_run = report.counts.not_run,
            "run complete"
        );
        report
    }

    fn run_scenario(
        &self,
        scenario: &Scenario,
        statuses: &BTreeMap<&str, EntryStatus>,
        state: &mut SharedState,
    ) -> ReportEntry {
        let name = scenario.name.as_str();
        if !scenario.enabled {
            tracing::debug!(scenario = name, "scenario disabled");
            return ReportEntry::not_attempted(name, EntryStatus::NotRun, "scenario is disabled".to_string());
        }
        if let Some(only) = &self.only {
            if !only.contains(name) {
                return ReportEntry::not_attempted(
                    name,
                    EntryStatus::NotRun,
                    "scenario not selected".to_string(),
                );
            }
        }
        for prerequisite in &scenario.requires {
            let status = statuses
                .get(prerequisite.as_str())
                .copied()
                .unwrap_or(EntryStatus::NotRun);
            if status != EntryStatus::Pass {
                let reason = format!(
                    "prerequisite {prerequisite} did not pass ({})",
                    status.as_str()
                );
                tracing::info!(scenario = name, reason = %reason, "scenario skipped");
                return ReportEntry::not_attempted(name, EntryStatus::Skipped, reason);
            }
        }

        tracing::info!(scenario = name, priority = scenario.priority, "scenario started");
        let started = Instant::now();
        let attempted = self
            .retry
            .run(name, |_| self.attempt(scenario, state.view()));
        let (verdict, detail) = match attempted.result {
            Ok((success, outputs)) => match store_outputs(scenario, outputs, state) {
                Ok(()) => (Verdict::Pass, scenario.summary(&success)),
                Err(err) => (Verdict::from(Err::<(), _>(err)), None),
            },
            Err(err) => (Verdict::from(Err::<(), _>(err)), None),
        };
        let elapsed_ms = started.elapsed().as_millis();
        let status = match &verdict {
            Verdict::Pass => EntryStatus::Pass,
            Verdict::Fail(_) => EntryStatus::Fail,
            Verdict::Skipped(_) => EntryStatus::Skipped,
        };
        tracing::info!(
            scenario = name,
            status = status.as_str(),
            attempts = attempted.attempts,
            elapsed_ms = elapsed_ms as u64,
            "scenario finished"
        );
        ReportEntry {
            scenario: name.to_string(),
            status,
            diagnostic: verdict.reason().map(str::to_string),
            detail,
            attempts: attempted.attempts,
            elapsed_ms,
        }
    }

    /// One attempt, including resolution of declared outputs, so a response
    /// missing an output field is classified like any other contract violation.
    fn attempt<'s>(
        &self,
        scenario: &'s Scenario,
        view: StateView<'_>,
    ) -> Result<(ScenarioSuccess, Vec<(&'s str, Value)>), HarnessError> {
        let success = match &scenario.body {
            ScenarioBody::Single(request) => {
                let request = request(&view)?;
                let outcome = self.transport.send(&request)?;
                scenario.contract.check(&outcome)?;
                ScenarioSuccess::Response(outcome)
            }
            ScenarioBody::Paginated {
                request,
                extract,
                options,
            } => {
                let request = request(&view)?;
                fetch_all_pages(&self.transport, &request, &scenario.contract, extract, *options)
                    .map(ScenarioSuccess::Pages)?
            }
        };
        let outputs = resolve_outputs(scenario, &success)?;
        Ok((success, outputs))
    }
}

/// Look up every declared output in the response; null counts as absent.
fn resolve_outputs<'s>(
    scenario: &'s Scenario,
    success: &ScenarioSuccess,
) -> Result<Vec<(&'s str, Value)>, HarnessError> {
    if scenario.outputs.is_empty() {
        return Ok(Vec::new());
    }
    let body = success
        .response()
        .ok_or_else(|| HarnessError::configuration("outputs require a single response"))?
        .json_body()
        .map_err(|err| HarnessError::contract(format!("response body is not valid JSON: {err}")))?;
    let mut values = Vec::with_capacity(scenario.outputs.len());
    for output in &scenario.outputs {
        match output.field.lookup(body) {
            Some(Value::Null) | None => {
                return Err(HarnessError::contract(format!(
                    "output field `{}` for shared key {:?} is absent from the response",
                    output.field, output.key
                )))
            }
            Some(value) => values.push((output.key.as_str(), value)),
        }
    }
    Ok(values)
}

/// Write resolved outputs to shared state, the only place it is mutated.
fn store_outputs(
    scenario: &Scenario,
    outputs: Vec<(&str, Value)>,
    state: &mut SharedState,
) -> Result<(), HarnessError> {
    for (key, value) in outputs {
        state.insert(key, &scenario.name, value)?;
    }
    Ok(())
}
