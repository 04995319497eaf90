//! The built-in expense journey

use serde_json::json;

use crate::http::HttpMethod;

use super::config::{ContentCheck, StepDefinition, WorkflowSpec};
use super::context::AUTH_TOKEN_KEY;

/// Name of the built-in workflow
pub const JOURNEY_NAME: &str = "Expense journey";

/// Fixture data sent by the built-in journey
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyParams {
    /// Email template; `{$timestamp}` keeps each run's account unique
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub amount: f64,
    pub description: String,
    pub expense_date: String,
    pub payment_method: String,
    pub updated_amount: f64,
    pub updated_description: String,
    pub updated_payment_method: String,
    /// Analytics query period; must cover `expense_date`
    pub month: u32,
    pub year: i32,
    /// Append a GET after the delete that expects 404
    pub verify_deletion: bool,
}

impl Default for JourneyParams {
    fn default() -> Self {
        Self {
            email: "e2e_user_{$timestamp}@example.com".to_string(),
            password: "Password123".to_string(),
            full_name: "E2E Test User".to_string(),
            amount: 100.50,
            description: "E2E Test Expense".to_string(),
            expense_date: "2026-01-21".to_string(),
            payment_method: "CARD".to_string(),
            updated_amount: 200.00,
            updated_description: "E2E Test Expense Updated".to_string(),
            updated_payment_method: "UPI".to_string(),
            month: 1,
            year: 2026,
            verify_deletion: true,
        }
    }
}

/// Register, create an expense, exercise reads and analytics, then clean up
pub fn expense_journey(params: &JourneyParams) -> WorkflowSpec {
    let period = format!("month={}&year={}", params.month, params.year);

    let mut steps = vec![
        StepDefinition::new("Register", HttpMethod::Post, "/auth/register", 201)
            .body(json!({
                "email": params.email,
                "password": params.password,
                "fullName": params.full_name,
            }))
            .check(ContentCheck::NonEmpty { path: "token".into() })
            .extract("token", AUTH_TOKEN_KEY)
            .success_message("Registration Successful. Token received."),
        // An empty list fails the extraction, which is fatal here
        StepDefinition::new("List Categories", HttpMethod::Get, "/categories", 200)
            .extract("0.id", "categoryId")
            .success_message("Categories verified."),
        StepDefinition::new("Create Expense", HttpMethod::Post, "/expenses", 201)
            .body(json!({
                "categoryId": "{categoryId}",
                "amount": params.amount,
                "description": params.description,
                "expenseDate": params.expense_date,
                "paymentMethod": params.payment_method,
            }))
            .extract("id", "expenseId")
            .success_message("Expense Created."),
        StepDefinition::new("Get Expense", HttpMethod::Get, "/expenses/{expenseId}", 200)
            .check(ContentCheck::Present { path: "id".into() })
            .success_message("Get Expense Verified."),
        StepDefinition::new(
            "Monthly Summary",
            HttpMethod::Get,
            &format!("/analytics/monthly-summary?{}", period),
            200,
        )
        .check(ContentCheck::Equals {
            path: "totalExpenses".into(),
            value: json!(params.amount),
        })
        .advisory()
        .success_message("Analytics Data Accurate."),
        StepDefinition::new("Update Expense", HttpMethod::Put, "/expenses/{expenseId}", 200)
            .body(json!({
                "categoryId": "{categoryId}",
                "amount": params.updated_amount,
                "description": params.updated_description,
                "expenseDate": params.expense_date,
                "paymentMethod": params.updated_payment_method,
            }))
            .advisory()
            .success_message("Update Expense Verified."),
        StepDefinition::new(
            "Filter Expenses",
            HttpMethod::Get,
            "/expenses?categoryId={categoryId}",
            200,
        )
        .check(ContentCheck::NonEmpty { path: "content".into() })
        .advisory()
        .success_message("Filtering Verified."),
        StepDefinition::new(
            "Category Breakdown",
            HttpMethod::Get,
            &format!("/analytics/category-breakdown?{}", period),
            200,
        )
        .advisory()
        .success_message("Category Breakdown Verified."),
        StepDefinition::new("Smart Insights", HttpMethod::Get, "/analytics/insights", 200)
            .advisory()
            .success_message("Smart Insights Verified."),
        StepDefinition::new("Delete Expense", HttpMethod::Delete, "/expenses/{expenseId}", 204)
            .success_message("Delete Verified (No Content)."),
    ];

    if params.verify_deletion {
        steps.push(
            StepDefinition::new("Verify Deletion", HttpMethod::Get, "/expenses/{expenseId}", 404)
                .advisory()
                .success_message("Deletion Confirmed (Not Found)."),
        );
    }

    let mut workflow = WorkflowSpec::new(JOURNEY_NAME, steps);
    workflow.description =
        Some("Primary user journey of the expense service, end to end.".to_string());
    workflow
}
