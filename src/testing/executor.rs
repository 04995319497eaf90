//! Single-step execution and outcome classification

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::common::Result;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

use super::config::{field_at, StepDefinition};
use super::context::{value_text, TestContext};
use super::result::{Outcome, StepResult};

/// Execute one step against the context
///
/// Every network or response problem becomes a [`StepResult`]. Only
/// authoring bugs (unwritten state keys, bad templates) come back as `Err`,
/// and those are raised before any request is sent. The context is written
/// only when the step succeeds.
pub async fn execute_step(
    client: &dyn HttpClient,
    step: &StepDefinition,
    context: &mut TestContext,
) -> Result<StepResult> {
    let request = build_request(step, context)?;

    let response = match client.send(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(step = %step.name, error = %e, "transport failure");
            return Ok(StepResult::new(
                &step.name,
                Outcome::Critical,
                format!("{} failed: {}", step.name, e),
            ));
        }
    };

    if !step.expect_status.contains(&response.status) {
        let outcome = step.policy.failure_outcome();
        info!(step = %step.name, status = response.status, %outcome, "unexpected status");
        let message = format!(
            "{} failed: expected status {}, got {}: {}",
            step.name,
            expected_list(&step.expect_status),
            response.status,
            response.snippet()
        );
        return Ok(StepResult::new(&step.name, outcome, message).with_response(response));
    }

    if let Some(check) = &step.check {
        if let Err(reason) = check.evaluate(&response.body) {
            info!(step = %step.name, %reason, "content mismatch");
            let message = format!("{} data mismatch: {}", step.name, reason);
            return Ok(StepResult::new(&step.name, Outcome::Warning, message).with_response(response));
        }
    }

    let extracted = match collect_extractions(step, &response) {
        Ok(values) => values,
        Err(missing) => {
            let outcome = step.policy.failure_outcome();
            info!(step = %step.name, field = %missing, %outcome, "extraction failed");
            let message = format!(
                "{} failed: response has no '{}' to store",
                step.name, missing
            );
            return Ok(StepResult::new(&step.name, outcome, message).with_response(response));
        }
    };

    let stored = describe_extractions(&extracted);
    for (key, value) in extracted {
        debug!(step = %step.name, key = %key, "stored state");
        context.set(key, value);
    }

    let base = step
        .success_message
        .clone()
        .unwrap_or_else(|| format!("{} verified.", step.name));
    let message = if stored.is_empty() {
        base
    } else {
        format!("{} ({})", base, stored)
    };

    Ok(StepResult::new(&step.name, Outcome::Success, message))
}

/// Resolve templates and headers into a request
pub fn build_request(step: &StepDefinition, context: &TestContext) -> Result<HttpRequest> {
    let url = context.url_for(&step.path)?;
    let body = step
        .body
        .as_ref()
        .map(|template| context.resolve_body(template))
        .transpose()?;

    Ok(HttpRequest {
        method: step.method,
        url,
        headers: context.auth_headers(),
        body,
    })
}

/// Look up every declared extraction; all must be present and non-null
fn collect_extractions(
    step: &StepDefinition,
    response: &HttpResponse,
) -> std::result::Result<Vec<(String, Value)>, String> {
    step.extract
        .iter()
        .map(|rule| match field_at(&response.body, &rule.from) {
            Some(value) if !value.is_null() => Ok((rule.into.clone(), value.clone())),
            _ => Err(rule.from.clone()),
        })
        .collect()
}

fn describe_extractions(extracted: &[(String, Value)]) -> String {
    extracted
        .iter()
        .map(|(key, value)| {
            if key.to_ascii_lowercase().contains("token") {
                format!("{} = [redacted]", key)
            } else {
                format!("{} = {}", key, value_text(value))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn expected_list(codes: &[u16]) -> String {
    codes
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}
