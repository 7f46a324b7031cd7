//! Scenario orchestration and request-contract engine.
//!
//! Scenarios declare a request, a response contract, and the shared values
//! they produce; the orchestrator schedules them, retries transient failures,
//! and records one report entry per scenario. Nothing in this module knows
//! about specific API endpoints.
mod contract;
mod error;
mod json_path;
mod pagination;
mod report;
mod request;
mod retry;
mod run;
mod scenario;
mod schedule;
mod state;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use contract::{Contract, Verdict};
pub use error::{HarnessError, TransportError, TransportErrorKind};
pub use json_path::FieldPath;
pub use pagination::{PageAggregate, PageOptions};
pub use report::{ConsoleSink, EntryStatus, ReportEntry, ReportSink, RunReport};
pub use request::{Method, RequestSpec, RequestTemplate};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
pub use run::Orchestrator;
pub use scenario::{Scenario, ScenarioSuccess};
pub use schedule::Plan;
pub use state::StateView;
pub use transport::{ResponseOutcome, Transport, UreqTransport};
