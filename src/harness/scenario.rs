//! Scenario declarations: what to send, what to expect, what to hand on.
use super::contract::Contract;
use super::error::HarnessError;
use super::json_path::FieldPath;
use super::pagination::{PageAggregate, PageOptions};
use super::request::RequestSpec;
use super::state::StateView;
use super::transport::ResponseOutcome;
use std::fmt;

/// Builds the request for one attempt from the values produced so far.
pub type RequestFn = Box<dyn Fn(&StateView<'_>) -> Result<RequestSpec, HarnessError>>;

/// Renders the one-line detail recorded for a passing scenario.
pub type SummaryFn = Box<dyn Fn(&ScenarioSuccess) -> String>;

pub enum ScenarioBody {
    Single(RequestFn),
    Paginated {
        request: RequestFn,
        extract: FieldPath,
        options: PageOptions,
    },
}

/// Shared value written on PASS from a field of the final response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub key: String,
    pub field: FieldPath,
}

/// What a passing attempt observed.
#[derive(Debug)]
pub enum ScenarioSuccess {
    Response(ResponseOutcome),
    Pages(PageAggregate),
}

impl ScenarioSuccess {
    pub fn response(&self) -> Option<&ResponseOutcome> {
        match self {
            ScenarioSuccess::Response(outcome) => Some(outcome),
            ScenarioSuccess::Pages(_) => None,
        }
    }
}

pub struct Scenario {
    pub name: String,
    pub priority: i32,
    pub requires: Vec<String>,
    pub body: ScenarioBody,
    pub contract: Contract,
    pub outputs: Vec<Output>,
    pub enabled: bool,
    summary: Option<SummaryFn>,
}

impl Scenario {
    pub fn single<F>(name: &str, priority: i32, contract: Contract, request: F) -> Self
    where
        F: Fn(&StateView<'_>) -> Result<RequestSpec, HarnessError> + 'static,
    {
        Scenario::with_body(name, priority, contract, ScenarioBody::Single(Box::new(request)))
    }

    /// Scenario whose `contract` applies to every page of a fixed page walk.
    pub fn paginated<F>(
        name: &str,
        priority: i32,
        page_contract: Contract,
        extract: &str,
        options: PageOptions,
        request: F,
    ) -> Self
    where
        F: Fn(&StateView<'_>) -> Result<RequestSpec, HarnessError> + 'static,
    {
        Scenario::with_body(
            name,
            priority,
            page_contract,
            ScenarioBody::Paginated {
                request: Box::new(request),
                extract: FieldPath::parse(extract),
                options,
            },
        )
    }

    fn with_body(name: &str, priority: i32, contract: Contract, body: ScenarioBody) -> Self {
        Scenario {
            name: name.to_string(),
            priority,
            requires: Vec::new(),
            body,
            contract,
            outputs: Vec::new(),
            enabled: true,
            summary: None,
        }
    }

    pub fn requires(mut self, prerequisite: &str) -> Self {
        self.requires.push(prerequisite.to_string());
        self
    }

    pub fn produces(mut self, key: &str, field: &str) -> Self {
        self.outputs.push(Output {
            key: key.to_string(),
            field: FieldPath::parse(field),
        });
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn summarize<F>(mut self, summary: F) -> Self
    where
        F: Fn(&ScenarioSuccess) -> String + 'static,
    {
        self.summary = Some(Box::new(summary));
        self
    }

    pub fn summary(&self, success: &ScenarioSuccess) -> Option<String> {
        self.summary.as_ref().map(|summary| summary(success))
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self.body, ScenarioBody::Paginated { .. })
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("requires", &self.requires)
            .field("paginated", &self.is_paginated())
            .field("outputs", &self.outputs)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
