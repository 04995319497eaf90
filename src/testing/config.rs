//! Workflow definition types
//!
//! Defines the declarative data structures for a journey: an ordered list of
//! HTTP steps, each with its expectations, state extractions and failure
//! policy. Workflows are built in code or deserialized from YAML scenarios.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::common::{Error, Result};
use crate::http::HttpMethod;

use super::result::Outcome;
use super::template;

/// A complete workflow loaded from code or a YAML file
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowSpec {
    /// Name of the workflow
    pub name: String,
    /// Optional description of what the workflow verifies
    #[serde(default)]
    pub description: Option<String>,
    /// The sequence of steps to execute, in order
    pub steps: Vec<StepDefinition>,
}

/// What a failing step means for the rest of the run
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Later steps depend on this one; a failure ends the run
    #[default]
    Fatal,
    /// Failure is logged and the run continues
    Advisory,
}

impl FailurePolicy {
    /// Outcome for an unexpected status or failed extraction
    pub fn failure_outcome(self) -> Outcome {
        match self {
            FailurePolicy::Fatal => Outcome::Error,
            FailurePolicy::Advisory => Outcome::Warning,
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Fatal => f.pad("FATAL"),
            FailurePolicy::Advisory => f.pad("ADVISORY"),
        }
    }
}

/// A single HTTP step in the journey
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StepDefinition {
    /// Step name, unique within the workflow
    pub name: String,
    pub method: HttpMethod,
    /// Path relative to the base URL; may contain `{key}` placeholders
    pub path: String,
    /// JSON body template
    #[serde(default)]
    pub body: Option<Value>,
    /// Accepted status codes
    pub expect_status: Vec<u16>,
    /// Deeper validation of the parsed body
    #[serde(default)]
    pub check: Option<ContentCheck>,
    /// Values to copy from the body into the context on success
    #[serde(default)]
    pub extract: Vec<Extraction>,
    #[serde(default)]
    pub policy: FailurePolicy,
    /// Message reported on success
    #[serde(default)]
    pub success_message: Option<String>,
}

/// Copy `from` (a field path in the response body) into context key `into`
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub from: String,
    pub into: String,
}

/// Declarative predicate over a response body
///
/// Paths are dot-separated; numeric segments index arrays, and an empty path
/// or `.` addresses the whole body.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentCheck {
    /// Field exists and is not null
    Present { path: String },
    /// Field exists and is not null, an empty string, array or object
    NonEmpty { path: String },
    /// Field equals the value; numbers compare numerically
    Equals { path: String, value: Value },
    /// Every nested check passes
    All { checks: Vec<ContentCheck> },
}

impl ContentCheck {
    /// Evaluate against a body, describing the first mismatch
    pub fn evaluate(&self, body: &Value) -> std::result::Result<(), String> {
        match self {
            ContentCheck::Present { path } => match field_at(body, path) {
                Some(v) if !v.is_null() => Ok(()),
                _ => Err(format!("'{}' is missing", display_path(path))),
            },
            ContentCheck::NonEmpty { path } => match field_at(body, path) {
                Some(v) if !is_empty_value(v) => Ok(()),
                Some(_) => Err(format!("'{}' is empty", display_path(path))),
                None => Err(format!("'{}' is missing", display_path(path))),
            },
            ContentCheck::Equals { path, value } => match field_at(body, path) {
                Some(actual) if json_equal(actual, value) => Ok(()),
                Some(actual) => Err(format!(
                    "'{}' is {}, expected {}",
                    display_path(path),
                    actual,
                    value
                )),
                None => Err(format!(
                    "'{}' is missing, expected {}",
                    display_path(path),
                    value
                )),
            },
            ContentCheck::All { checks } => checks.iter().try_for_each(|c| c.evaluate(body)),
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn json_equal(actual: &Value, expected: &Value) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) if actual.is_number() && expected.is_number() => {
            (a - b).abs() < 1e-9
        }
        _ => actual == expected,
    }
}

/// Look up a dot-separated field path in a JSON value
pub fn field_at<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() || path == "." {
        return Some(body);
    }

    let mut current = body;
    for segment in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            Value::Object(map) => map.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

impl StepDefinition {
    pub fn new(name: &str, method: HttpMethod, path: &str, expect_status: u16) -> Self {
        Self {
            name: name.to_string(),
            method,
            path: path.to_string(),
            body: None,
            expect_status: vec![expect_status],
            check: None,
            extract: Vec::new(),
            policy: FailurePolicy::Fatal,
            success_message: None,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn check(mut self, check: ContentCheck) -> Self {
        self.check = Some(check);
        self
    }

    pub fn extract(mut self, from: &str, into: &str) -> Self {
        self.extract.push(Extraction {
            from: from.to_string(),
            into: into.to_string(),
        });
        self
    }

    pub fn advisory(mut self) -> Self {
        self.policy = FailurePolicy::Advisory;
        self
    }

    pub fn success_message(mut self, message: &str) -> Self {
        self.success_message = Some(message.to_string());
        self
    }

    /// Every placeholder name used by the path and body templates
    pub fn referenced_names(&self) -> Vec<String> {
        let mut names: Vec<String> = template::placeholders(&self.path)
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Some(body) = &self.body {
            collect_body_names(body, &mut names);
        }
        names
    }

    /// State keys (not built-ins) the step reads
    pub fn state_reads(&self) -> Vec<String> {
        self.referenced_names()
            .into_iter()
            .filter(|name| !template::is_builtin(name))
            .collect()
    }
}

fn collect_body_names(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(text) => names.extend(template::placeholders(text).into_iter().map(str::to_string)),
        Value::Array(items) => items.iter().for_each(|v| collect_body_names(v, names)),
        Value::Object(map) => map.values().for_each(|v| collect_body_names(v, names)),
        _ => {}
    }
}

impl WorkflowSpec {
    pub fn new(name: &str, steps: Vec<StepDefinition>) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            steps,
        }
    }

    /// Parse a workflow from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ScenarioParse(e.to_string()))
    }

    /// Load a workflow from a YAML scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::from_yaml(&content).map_err(|e| match e {
            Error::ScenarioParse(msg) => {
                Error::ScenarioParse(format!("'{}': {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Pre-flight check for authoring bugs, run before any traffic
    ///
    /// A state key only counts as available once a `Fatal` step without a
    /// content check extracts it. Such a step either succeeds and writes its
    /// keys or ends the run. An advisory step, or a checked step whose check
    /// fails with a warning, lets the run continue with the keys unwritten.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::InvalidWorkflow(format!(
                "workflow '{}' has no steps",
                self.name
            )));
        }

        let mut seen_names = HashSet::new();
        let mut guaranteed: HashSet<&str> = HashSet::new();

        for step in &self.steps {
            if !seen_names.insert(step.name.as_str()) {
                return Err(Error::InvalidWorkflow(format!(
                    "duplicate step name '{}'",
                    step.name
                )));
            }

            if step.expect_status.is_empty() {
                return Err(Error::InvalidWorkflow(format!(
                    "step '{}' accepts no status codes",
                    step.name
                )));
            }

            if let Some(code) = step.expect_status.iter().find(|c| !(100..=599).contains(*c)) {
                return Err(Error::InvalidWorkflow(format!(
                    "step '{}' expects invalid status code {}",
                    step.name, code
                )));
            }

            for name in step.referenced_names() {
                template::check_builtin(&name)?;
                if !template::is_builtin(&name) && !guaranteed.contains(name.as_str()) {
                    debug!(step = %step.name, key = %name, "step reads unwritten state");
                    return Err(Error::missing_state(&name));
                }
            }

            for extraction in &step.extract {
                if template::is_builtin(&extraction.into) || extraction.into.is_empty() {
                    return Err(Error::InvalidWorkflow(format!(
                        "step '{}' extracts into reserved key '{}'",
                        step.name, extraction.into
                    )));
                }
                if step.policy == FailurePolicy::Fatal && step.check.is_none() {
                    guaranteed.insert(extraction.into.as_str());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_at_paths() {
        let body = json!({"content": [{"id": "a"}, {"id": "b"}], "total": 2});
        assert_eq!(field_at(&body, "total"), Some(&json!(2)));
        assert_eq!(field_at(&body, "content.1.id"), Some(&json!("b")));
        assert_eq!(field_at(&body, ""), Some(&body));
        assert_eq!(field_at(&body, "."), Some(&body));
        assert_eq!(field_at(&body, "content.9.id"), None);
        assert_eq!(field_at(&body, "total.value"), None);

        let list = json!([{"id": 7}]);
        assert_eq!(field_at(&list, "0.id"), Some(&json!(7)));
        assert_eq!(field_at(&list, "first.id"), None);
    }

    #[test]
    fn test_equals_compares_numbers_numerically() {
        let check = ContentCheck::Equals {
            path: "totalExpenses".into(),
            value: json!(100.50),
        };
        assert!(check.evaluate(&json!({"totalExpenses": 100.5})).is_ok());
        assert!(check.evaluate(&json!({"totalExpenses": 100.50000})).is_ok());

        let err = check.evaluate(&json!({"totalExpenses": 0})).unwrap_err();
        assert_eq!(err, "'totalExpenses' is 0, expected 100.5");

        let err = check.evaluate(&json!({})).unwrap_err();
        assert_eq!(err, "'totalExpenses' is missing, expected 100.5");

        assert!(check.evaluate(&json!({"totalExpenses": "100.5"})).is_err());
    }

    #[test]
    fn test_non_empty_and_present() {
        let non_empty = ContentCheck::NonEmpty { path: "content".into() };
        assert!(non_empty.evaluate(&json!({"content": [1]})).is_ok());
        assert_eq!(
            non_empty.evaluate(&json!({"content": []})).unwrap_err(),
            "'content' is empty"
        );
        assert_eq!(
            non_empty.evaluate(&json!({})).unwrap_err(),
            "'content' is missing"
        );

        let present = ContentCheck::Present { path: "id".into() };
        assert!(present.evaluate(&json!({"id": ""})).is_ok());
        assert!(present.evaluate(&json!({"id": null})).is_err());
    }

    #[test]
    fn test_all_reports_first_failure() {
        let check = ContentCheck::All {
            checks: vec![
                ContentCheck::Present { path: "id".into() },
                ContentCheck::NonEmpty { path: "name".into() },
            ],
        };
        assert!(check.evaluate(&json!({"id": 1, "name": "Food"})).is_ok());
        assert_eq!(
            check.evaluate(&json!({"id": 1, "name": ""})).unwrap_err(),
            "'name' is empty"
        );
    }

    #[test]
    fn test_state_reads_skip_builtins() {
        let step = StepDefinition::new("Update", HttpMethod::Put, "/expenses/{expenseId}", 200).body(
            json!({"categoryId": "{categoryId}", "note": "run {$timestamp}"}),
        );
        let mut reads = step.state_reads();
        reads.sort();
        assert_eq!(reads, vec!["categoryId", "expenseId"]);
    }

    fn register() -> StepDefinition {
        StepDefinition::new("Register", HttpMethod::Post, "/auth/register", 201)
            .extract("token", "authToken")
    }

    #[test]
    fn test_validate_accepts_ordered_workflow() {
        let workflow = WorkflowSpec::new(
            "ok",
            vec![
                register(),
                StepDefinition::new("Create", HttpMethod::Post, "/expenses", 201)
                    .extract("id", "expenseId"),
                StepDefinition::new("Get", HttpMethod::Get, "/expenses/{expenseId}", 200),
            ],
        );
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_read_before_write() {
        let workflow = WorkflowSpec::new(
            "bad",
            vec![
                StepDefinition::new("Get", HttpMethod::Get, "/expenses/{expenseId}", 200),
                StepDefinition::new("Create", HttpMethod::Post, "/expenses", 201)
                    .extract("id", "expenseId"),
            ],
        );
        assert!(matches!(
            workflow.validate(),
            Err(Error::MissingState { key }) if key == "expenseId"
        ));
    }

    #[test]
    fn test_validate_rejects_keys_only_written_by_advisory_steps() {
        let workflow = WorkflowSpec::new(
            "advisory-source",
            vec![
                StepDefinition::new("Create", HttpMethod::Post, "/expenses", 201)
                    .extract("id", "expenseId")
                    .advisory(),
                StepDefinition::new("Get", HttpMethod::Get, "/expenses/{expenseId}", 200),
            ],
        );
        assert!(matches!(workflow.validate(), Err(Error::MissingState { .. })));
    }

    #[test]
    fn test_validate_rejects_keys_written_by_checked_steps() {
        let workflow = WorkflowSpec::new(
            "checked-source",
            vec![
                StepDefinition::new("Create", HttpMethod::Post, "/expenses", 201)
                    .check(ContentCheck::Equals {
                        path: "amount".into(),
                        value: json!(100.5),
                    })
                    .extract("id", "expenseId"),
                StepDefinition::new("Get", HttpMethod::Get, "/expenses/{expenseId}", 200),
            ],
        );
        assert!(matches!(
            workflow.validate(),
            Err(Error::MissingState { key }) if key == "expenseId"
        ));
    }

    #[test]
    fn test_validate_allows_checked_steps_whose_keys_are_never_read() {
        let workflow = WorkflowSpec::new(
            "checked-token",
            vec![
                StepDefinition::new("Register", HttpMethod::Post, "/auth/register", 201)
                    .check(ContentCheck::NonEmpty { path: "token".into() })
                    .extract("token", "authToken"),
                StepDefinition::new("Insights", HttpMethod::Get, "/analytics/insights", 200),
            ],
        );
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_validate_structural_errors() {
        assert!(matches!(
            WorkflowSpec::new("empty", vec![]).validate(),
            Err(Error::InvalidWorkflow(_))
        ));

        assert!(matches!(
            WorkflowSpec::new("dup", vec![register(), register()]).validate(),
            Err(Error::InvalidWorkflow(msg)) if msg.contains("duplicate")
        ));

        let mut no_status = register();
        no_status.expect_status.clear();
        assert!(matches!(
            WorkflowSpec::new("no-status", vec![no_status]).validate(),
            Err(Error::InvalidWorkflow(_))
        ));

        let mut bad_status = register();
        bad_status.expect_status = vec![42];
        assert!(matches!(
            WorkflowSpec::new("bad-status", vec![bad_status]).validate(),
            Err(Error::InvalidWorkflow(_))
        ));

        let reserved = StepDefinition::new("Register", HttpMethod::Post, "/auth/register", 201)
            .extract("token", "$timestamp");
        assert!(matches!(
            WorkflowSpec::new("reserved", vec![reserved]).validate(),
            Err(Error::InvalidWorkflow(_))
        ));
    }

    #[test]
    fn test_yaml_step_defaults() {
        let workflow = WorkflowSpec::from_yaml(
            r#"
name: minimal
steps:
  - name: Insights
    method: GET
    path: /analytics/insights
    expect_status: [200]
  - name: Summary
    method: GET
    path: /analytics/monthly-summary?month=1&year=2026
    expect_status: [200]
    policy: advisory
    check: { kind: equals, path: totalExpenses, value: 100.50 }
"#,
        )
        .unwrap();

        let first = &workflow.steps[0];
        assert_eq!(first.policy, FailurePolicy::Fatal);
        assert!(first.body.is_none());
        assert!(first.extract.is_empty());

        let second = &workflow.steps[1];
        assert_eq!(second.policy, FailurePolicy::Advisory);
        assert_eq!(
            second.check,
            Some(ContentCheck::Equals {
                path: "totalExpenses".into(),
                value: json!(100.5)
            })
        );
    }

    #[test]
    fn test_yaml_parse_error_is_scenario_parse() {
        let err = WorkflowSpec::from_yaml("name: x\nsteps: 3").unwrap_err();
        assert!(matches!(err, Error::ScenarioParse(_)));
    }
}
