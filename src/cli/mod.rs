//! CLI command handling
//!
//! Resolves configuration, builds the workflow and drives a run.

use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use crate::commands::{Commands, RunArgs};
use crate::common::{config::Config, paths, Error, Result};
use crate::http::ReqwestClient;
use crate::testing::{
    expense_journey, run_workflow, ConsoleReporter, FailurePolicy, JourneyParams, RunSummary,
    StepDefinition, TestContext, WorkflowSpec,
};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Run(args) => {
            let summary = run(args).await?;
            Ok(if summary.is_completed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Steps {
            scenario,
            skip_delete_check,
        } => {
            let config = Config::load()?;
            let verify = config.journey.verify_deletion && !skip_delete_check;
            let workflow = load_workflow(scenario.as_deref(), verify)?;
            workflow.validate()?;

            println!("{} ({} steps)", workflow.name.bold(), workflow.steps.len());
            if let Some(description) = &workflow.description {
                println!("{}", description.dimmed());
            }
            for (i, step) in workflow.steps.iter().enumerate() {
                let line = plan_line(i + 1, step);
                match step.policy {
                    FailurePolicy::Fatal => println!("{}", line),
                    FailurePolicy::Advisory => println!("{}", line.dimmed()),
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::ConfigPath => {
            let path = paths::config_path()
                .ok_or_else(|| Error::Config("no config directory on this platform".to_string()))?;
            let marker = if path.exists() { "" } else { " (not found, using defaults)" };
            println!("{}{}", path.display(), marker);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolve config, build the client and run the selected workflow
///
/// The run happens on its own task so a panic inside it is reported as a
/// failed run rather than tearing down the process mid-output.
pub async fn run(args: RunArgs) -> Result<RunSummary> {
    let config = load_config(&args)?;
    let base_url = config.base_url()?;
    let verify = config.journey.verify_deletion && !args.skip_delete_check;
    let workflow = load_workflow(args.scenario.as_deref(), verify)?;
    let client = ReqwestClient::from_config(&config)?;
    let verbose = args.verbose;

    tracing::info!(base_url = %base_url, workflow = %workflow.name, "starting run");

    let handle = tokio::spawn(async move {
        let mut reporter = ConsoleReporter::new(verbose);
        run_workflow(&workflow, TestContext::new(base_url), &client, &mut reporter).await
    });

    handle
        .await
        .map_err(|e| Error::Internal(format!("run task failed: {}", e)))?
}

/// Layer config file, environment and flags
///
/// `--config` must point at an existing file; otherwise the default location
/// is used when present.
pub fn load_config(args: &RunArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    config.apply_env();
    config.apply_base_url_override(args.base_url.clone());

    if let Some(secs) = args.timeout {
        config.timeouts.request_secs = secs;
    }
    config.timeouts.validate()?;

    Ok(config)
}

/// The YAML scenario when given, otherwise the built-in journey
pub fn load_workflow(scenario: Option<&Path>, verify_deletion: bool) -> Result<WorkflowSpec> {
    match scenario {
        Some(path) => WorkflowSpec::load(path),
        None => Ok(expense_journey(&JourneyParams {
            verify_deletion,
            ..Default::default()
        })),
    }
}

/// One row of the step plan
pub fn plan_line(index: usize, step: &StepDefinition) -> String {
    let expected = step
        .expect_status
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "{:>3}. {:<6} {:<45} {:<8} expect {}  {}",
        index, step.method, step.path, step.policy, expected, step.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn test_plan_line() {
        let step = StepDefinition::new("Delete Expense", HttpMethod::Delete, "/expenses/{expenseId}", 204);
        let line = plan_line(10, &step);
        assert!(line.starts_with(" 10. DELETE /expenses/{expenseId}"));
        assert!(line.contains("FATAL"));
        assert!(line.contains("expect 204"));
        assert!(line.ends_with("Delete Expense"));
    }

    #[test]
    fn test_builtin_workflow_honors_verify_flag() {
        assert_eq!(load_workflow(None, true).unwrap().steps.len(), 11);
        assert_eq!(load_workflow(None, false).unwrap().steps.len(), 10);
    }

    #[test]
    fn test_zero_timeout_is_rejected_after_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timeouts]\nrequest_secs = 5\n").unwrap();

        let args = RunArgs {
            config: Some(path),
            timeout: Some(0),
            ..Default::default()
        };
        let err = load_config(&args).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("request_secs")));
    }

    #[test]
    fn test_zero_timeout_in_config_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timeouts]\nconnect_secs = 0\n").unwrap();

        let args = RunArgs {
            config: Some(path),
            ..Default::default()
        };
        assert!(matches!(load_config(&args), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_scenario_is_file_error() {
        let err = load_workflow(Some(Path::new("/nonexistent/journey.yaml")), true).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
