//! Workflow orchestration
//!
//! Runs a workflow's steps strictly in order, one at a time, and decides
//! after each step whether the run can go on.

use tracing::{info, info_span, warn, Instrument};

use crate::common::Result;
use crate::http::HttpClient;

use super::config::{FailurePolicy, WorkflowSpec};
use super::context::TestContext;
use super::executor::execute_step;
use super::report::Reporter;
use super::result::{Outcome, RunOutcome, RunState, RunSummary, StepState};

/// Whether a step result ends the run
pub fn should_abort(outcome: Outcome, policy: FailurePolicy) -> bool {
    match outcome {
        Outcome::Critical => true,
        Outcome::Error => policy == FailurePolicy::Fatal,
        Outcome::Success | Outcome::Warning => false,
    }
}

/// Drives a workflow through the executor and reports progress
pub struct Orchestrator<'a> {
    client: &'a dyn HttpClient,
    reporter: &'a mut dyn Reporter,
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(client: &'a dyn HttpClient, reporter: &'a mut dyn Reporter) -> Self {
        Self {
            client,
            reporter,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every step of `workflow` against a fresh context
    ///
    /// Returns `Err` only for authoring bugs: the pre-flight validation fails
    /// or a step reads state that was never written. The context is dropped
    /// when the run ends.
    pub async fn run(&mut self, workflow: &WorkflowSpec, mut context: TestContext) -> Result<RunSummary> {
        if let Err(e) = workflow.validate() {
            self.state = RunState::Aborted;
            return Err(e);
        }

        self.state = RunState::Running;
        info!(workflow = %workflow.name, steps = workflow.steps.len(), base_url = %context.base_url(), "run started");

        let mut step_states: Vec<(String, StepState)> = workflow
            .steps
            .iter()
            .map(|s| (s.name.clone(), StepState::Pending))
            .collect();
        let mut results = Vec::with_capacity(workflow.steps.len());
        let mut aborted_at = None;

        for (i, step) in workflow.steps.iter().enumerate() {
            let step_num = i + 1;
            step_states[i].1 = StepState::Executing;
            self.reporter.step_started(step_num, step);

            let span = info_span!("step", index = step_num, name = %step.name);
            let result = match execute_step(self.client, step, &mut context)
                .instrument(span)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    warn!(step = %step.name, error = %e, "workflow is malformed");
                    self.state = RunState::Aborted;
                    return Err(e);
                }
            };

            step_states[i].1 = StepState::from(result.outcome);
            self.reporter.step_finished(&result);
            let abort = should_abort(result.outcome, step.policy);
            results.push(result);

            if abort {
                warn!(step = %step.name, "aborting run");
                aborted_at = Some(step.name.clone());
                for (_, state) in step_states.iter_mut().skip(step_num) {
                    *state = StepState::AbortedRun;
                }
                break;
            }
        }

        let clean = results.iter().all(|r| !r.outcome.is_failure());
        let outcome = if aborted_at.is_none() && clean {
            RunOutcome::Completed
        } else {
            RunOutcome::Aborted
        };
        self.state = match outcome {
            RunOutcome::Completed => RunState::Completed,
            RunOutcome::Aborted => RunState::Aborted,
        };

        let summary = RunSummary {
            workflow: workflow.name.clone(),
            results,
            step_states,
            outcome,
            aborted_at,
        };
        info!(outcome = %summary.outcome, attempted = summary.attempted(), "run finished");
        self.reporter.summary(&summary);

        Ok(summary)
    }
}

/// Run a workflow with a one-off orchestrator
pub async fn run_workflow(
    workflow: &WorkflowSpec,
    context: TestContext,
    client: &dyn HttpClient,
    reporter: &mut dyn Reporter,
) -> Result<RunSummary> {
    Orchestrator::new(client, reporter).run(workflow, context).await
}
