//! Request and response values exchanged with the HTTP client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Header name to value, ordered for stable output
pub type HeaderSet = BTreeMap<String, String>;

/// HTTP verbs used by workflow steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully resolved request, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including query string
    pub url: String,
    pub headers: HeaderSet,
    /// JSON body; sent with `Content-Type: application/json`
    pub body: Option<Value>,
}

/// Status plus body of a received response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed JSON body, `Value::Null` when empty or not JSON
    pub body: Value,
    /// Raw body text, kept for diagnostics
    pub text: String,
}

impl HttpResponse {
    /// Build a response from raw body text
    pub fn from_text(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };
        Self { status, body, text }
    }

    /// Build a response from a JSON body
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            text: body.to_string(),
            body,
        }
    }

    /// Short form used in step messages: the body text, truncated
    pub fn snippet(&self) -> String {
        const LIMIT: usize = 200;
        let text = self.text.trim();
        if text.is_empty() {
            return format!("HTTP {} (empty body)", self.status);
        }
        if text.chars().count() > LIMIT {
            let cut: String = text.chars().take(LIMIT).collect();
            format!("{}...", cut)
        } else {
            text.to_string()
        }
    }
}
