//! Step and run result types

use std::fmt;

use crate::http::HttpResponse;

/// Classification of one executed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    /// Advisory failure or content mismatch; the run continues
    Warning,
    /// Unexpected response on a fatal step
    Error,
    /// No response at all
    Critical,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Success,
        Outcome::Warning,
        Outcome::Error,
        Outcome::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Warning => "WARNING",
            Outcome::Error => "ERROR",
            Outcome::Critical => "CRITICAL",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Error | Outcome::Critical)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one step, created once and never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub name: String,
    pub outcome: Outcome,
    pub message: String,
    /// Raw response, kept when the step did not succeed
    pub response: Option<HttpResponse>,
}

impl StepResult {
    pub fn new(name: &str, outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }
}

/// Lifecycle of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Running,
    Completed,
    Aborted,
}

/// Final classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Aborted,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => f.write_str("COMPLETED"),
            RunOutcome::Aborted => f.write_str("ABORTED"),
        }
    }
}

/// Lifecycle of a single declared step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Executing,
    Passed,
    Warned,
    Failed,
    /// Never reached because an earlier step aborted the run
    AbortedRun,
}

impl From<Outcome> for StepState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => StepState::Passed,
            Outcome::Warning => StepState::Warned,
            Outcome::Error | Outcome::Critical => StepState::Failed,
        }
    }
}

/// Aggregate of a finished (or aborted) run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub workflow: String,
    /// One result per attempted step, in execution order
    pub results: Vec<StepResult>,
    /// Final state of every declared step, in declaration order
    pub step_states: Vec<(String, StepState)>,
    pub outcome: RunOutcome,
    /// Step that triggered the abort
    pub aborted_at: Option<String>,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn total_steps(&self) -> usize {
        self.step_states.len()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    pub fn result_for(&self, name: &str) -> Option<&StepResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn state_of(&self, name: &str) -> Option<StepState> {
        self.step_states
            .iter()
            .find(|(step, _)| step == name)
            .map(|(_, state)| *state)
    }

    /// Human-readable one-line summary
    pub fn message(&self) -> String {
        let counts = format!(
            "{} success, {} warning, {} error, {} critical",
            self.count(Outcome::Success),
            self.count(Outcome::Warning),
            self.count(Outcome::Error),
            self.count(Outcome::Critical)
        );

        match (&self.outcome, &self.aborted_at) {
            (RunOutcome::Completed, _) => format!(
                "{} completed: {}/{} steps attempted ({})",
                self.workflow,
                self.attempted(),
                self.total_steps(),
                counts
            ),
            (RunOutcome::Aborted, Some(step)) => format!(
                "{} aborted at '{}': {}/{} steps attempted ({})",
                self.workflow,
                step,
                self.attempted(),
                self.total_steps(),
                counts
            ),
            (RunOutcome::Aborted, None) => format!(
                "{} aborted: {}/{} steps attempted ({})",
                self.workflow,
                self.attempted(),
                self.total_steps(),
                counts
            ),
        }
    }
}
