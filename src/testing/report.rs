//! Status line rendering
//!
//! Every line has the form `[<SEVERITY>] <message>`.

use colored::{ColoredString, Colorize};
use std::fmt;

use crate::common::Error;

use super::config::StepDefinition;
use super::result::{Outcome, RunSummary, StepResult};

/// Tag printed in front of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    fn paint(self, tag: &str) -> ColoredString {
        match self {
            Severity::Info => tag.blue(),
            Severity::Success => tag.green(),
            Severity::Warning => tag.yellow(),
            Severity::Error => tag.red(),
            Severity::Critical => tag.red().bold(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Outcome> for Severity {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => Severity::Success,
            Outcome::Warning => Severity::Warning,
            Outcome::Error => Severity::Error,
            Outcome::Critical => Severity::Critical,
        }
    }
}

/// Severity of the final summary line
pub fn summary_severity(summary: &RunSummary) -> Severity {
    if summary.count(Outcome::Critical) > 0 {
        Severity::Critical
    } else if !summary.is_completed() {
        Severity::Error
    } else if summary.count(Outcome::Warning) > 0 {
        Severity::Warning
    } else {
        Severity::Success
    }
}

/// Uncoloured status line
pub fn render_line(severity: Severity, message: &str) -> String {
    format!("[{}] {}", severity, message)
}

/// Receives progress from the orchestrator
pub trait Reporter: Send {
    fn step_started(&mut self, index: usize, step: &StepDefinition);
    fn step_finished(&mut self, result: &StepResult);
    fn summary(&mut self, summary: &RunSummary);
    /// A fault that ended the run without a summary
    fn fatal(&mut self, error: &Error);
}

fn fatal_message(error: &Error) -> String {
    if error.is_authoring_bug() {
        format!("Malformed workflow: {}", error)
    } else {
        format!("Run failed: {}", error)
    }
}

/// Writes coloured status lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn print(&self, severity: Severity, message: &str) {
        let tag = format!("[{}]", severity);
        println!("{} {}", severity.paint(&tag), message);
    }
}

impl Reporter for ConsoleReporter {
    fn step_started(&mut self, _index: usize, step: &StepDefinition) {
        self.print(Severity::Info, &format!("Testing {}...", step.name));
    }

    fn step_finished(&mut self, result: &StepResult) {
        self.print(result.outcome.into(), &result.message);

        if self.verbose && result.outcome != Outcome::Success {
            if let Some(response) = &result.response {
                println!("    {} {}", "status:".dimmed(), response.status);
                println!("    {} {}", "body:".dimmed(), response.snippet().dimmed());
            }
        }
    }

    fn summary(&mut self, summary: &RunSummary) {
        self.print(summary_severity(summary), &summary.message());
    }

    fn fatal(&mut self, error: &Error) {
        self.print(Severity::Critical, &fatal_message(error));
    }
}

/// Collects rendered lines in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub lines: Vec<String>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for RecordingReporter {
    fn step_started(&mut self, _index: usize, step: &StepDefinition) {
        self.lines
            .push(render_line(Severity::Info, &format!("Testing {}...", step.name)));
    }

    fn step_finished(&mut self, result: &StepResult) {
        self.lines
            .push(render_line(result.outcome.into(), &result.message));
    }

    fn summary(&mut self, summary: &RunSummary) {
        self.lines
            .push(render_line(summary_severity(summary), &summary.message()));
    }

    fn fatal(&mut self, error: &Error) {
        self.lines
            .push(render_line(Severity::Critical, &fatal_message(error)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::result::{RunOutcome, StepState};

    fn summary(outcomes: &[Outcome], outcome: RunOutcome) -> RunSummary {
        RunSummary {
            workflow: "journey".into(),
            results: outcomes
                .iter()
                .enumerate()
                .map(|(i, o)| StepResult::new(&format!("step {}", i), *o, "msg"))
                .collect(),
            step_states: outcomes
                .iter()
                .enumerate()
                .map(|(i, o)| (format!("step {}", i), StepState::from(*o)))
                .collect(),
            outcome,
            aborted_at: None,
        }
    }

    #[test]
    fn test_render_line_format() {
        assert_eq!(
            render_line(Severity::Warning, "Analytics Data Mismatch"),
            "[WARNING] Analytics Data Mismatch"
        );
        assert_eq!(render_line(Outcome::Critical.into(), "boom"), "[CRITICAL] boom");
    }

    #[test]
    fn test_summary_severity() {
        let clean = summary(&[Outcome::Success, Outcome::Success], RunOutcome::Completed);
        assert_eq!(summary_severity(&clean), Severity::Success);

        let warned = summary(&[Outcome::Success, Outcome::Warning], RunOutcome::Completed);
        assert_eq!(summary_severity(&warned), Severity::Warning);

        let failed = summary(&[Outcome::Success, Outcome::Error], RunOutcome::Aborted);
        assert_eq!(summary_severity(&failed), Severity::Error);

        let critical = summary(&[Outcome::Critical], RunOutcome::Aborted);
        assert_eq!(summary_severity(&critical), Severity::Critical);
    }

    #[test]
    fn test_recording_reporter_fatal_marks_authoring_bugs() {
        let mut reporter = RecordingReporter::new();
        reporter.fatal(&Error::missing_state("expenseId"));
        reporter.fatal(&Error::Config("bad base URL".into()));
        assert_eq!(
            reporter.lines,
            vec![
                "[CRITICAL] Malformed workflow: Workflow reads state key 'expenseId' before any step writes it",
                "[CRITICAL] Run failed: Configuration error: bad base URL",
            ]
        );
    }
}
