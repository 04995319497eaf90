//! Workflow engine
//!
//! Declarative HTTP workflows executed step by step against a live service.
//! Data produced by one step (a token, an id) is stored in a [`TestContext`]
//! and feeds the templates of later steps. Each step carries a failure
//! policy that decides whether a failure ends the run.

mod config;
mod context;
mod executor;
#[cfg(test)]
mod fake;
mod journey;
mod report;
mod result;
mod runner;
pub mod template;

pub use config::{field_at, ContentCheck, Extraction, FailurePolicy, StepDefinition, WorkflowSpec};
pub use context::{value_text, TestContext, AUTH_TOKEN_KEY};
pub use executor::{build_request, execute_step};
pub use journey::{expense_journey, JourneyParams, JOURNEY_NAME};
pub use report::{
    render_line, summary_severity, ConsoleReporter, RecordingReporter, Reporter, Severity,
};
pub use result::{Outcome, RunOutcome, RunState, RunSummary, StepResult, StepState};
pub use runner::{run_workflow, should_abort, Orchestrator};
