//! Static wiring validation and execution order for a set of scenarios.
use super::error::HarnessError;
use super::scenario::Scenario;
use std::collections::{BTreeMap, BTreeSet};

/// Validated scenarios plus the order they will run in.
#[derive(Debug)]
pub struct Plan {
    scenarios: Vec<Scenario>,
    order: Vec<usize>,
}

impl Plan {
    /// Validate wiring and compute the schedule.
    ///
    /// The schedule is topological; among scenarios whose prerequisites have
    /// all been scheduled, the lowest `(priority, declaration index)` goes
    /// first.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Plan, HarnessError> {
        let mut index_by_name = BTreeMap::new();
        for (idx, scenario) in scenarios.iter().enumerate() {
            if index_by_name.insert(scenario.name.as_str(), idx).is_some() {
                return Err(HarnessError::configuration(format!(
                    "duplicate scenario name {:?}",
                    scenario.name
                )));
            }
        }

        let mut output_writers: BTreeMap<&str, &str> = BTreeMap::new();
        for scenario in &scenarios {
            if scenario.is_paginated() && !scenario.outputs.is_empty() {
                return Err(HarnessError::configuration(format!(
                    "paginated scenario {:?} may not declare outputs",
                    scenario.name
                )));
            }
            for output in &scenario.outputs {
                if let Some(writer) = output_writers.insert(&output.key, &scenario.name) {
                    return Err(HarnessError::configuration(format!(
                        "shared key {:?} is produced by both {writer:?} and {:?}",
                        output.key, scenario.name
                    )));
                }
            }
        }

        let mut prerequisites: Vec<Vec<usize>> = Vec::with_capacity(scenarios.len());
        for scenario in &scenarios {
            let mut deps = Vec::with_capacity(scenario.requires.len());
            for name in &scenario.requires {
                let Some(&dep) = index_by_name.get(name.as_str()) else {
                    return Err(HarnessError::configuration(format!(
                        "scenario {:?} requires unknown scenario {name:?}",
                        scenario.name
                    )));
                };
                deps.push(dep);
            }
            prerequisites.push(deps);
        }

        let order = schedule(&scenarios, &prerequisites)?;
        Ok(Plan { scenarios, order })
    }

    /// Scenarios in execution order.
    pub fn order(&self) -> impl Iterator<Item = &Scenario> + '_ {
        self.order.iter().map(|&idx| &self.scenarios[idx])
    }

    pub fn names(&self) -> Vec<&str> {
        self.order().map(|scenario| scenario.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.name == name)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

fn schedule(scenarios: &[Scenario], prerequisites: &[Vec<usize>]) -> Result<Vec<usize>, HarnessError> {
    let mut pending: Vec<usize> = prerequisites.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); scenarios.len()];
    for (idx, deps) in prerequisites.iter().enumerate() {
        for &dep in deps {
            dependents[dep].push(idx);
        }
    }

    let mut ready: BTreeSet<(i32, usize)> = pending
        .iter()
        .enumerate()
        .filter(|(_, &count)| count == 0)
        .map(|(idx, _)| (scenarios[idx].priority, idx))
        .collect();
    let mut order = Vec::with_capacity(scenarios.len());
    while let Some(next) = ready.pop_first() {
        let idx = next.1;
        order.push(idx);
        for &dependent in &dependents[idx] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.insert((scenarios[dependent].priority, dependent));
            }
        }
    }

    if order.len() < scenarios.len() {
        let stuck: Vec<&str> = pending
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(idx, _)| scenarios[idx].name.as_str())
            .collect();
        return Err(HarnessError::configuration(format!(
            "dependency cycle among scenarios: {}",
            stuck.join(", ")
        )));
    }
    Ok(order)
}
