//! Mutable state threaded through a workflow run
//!
//! Steps never share variables directly. Every identifier a step produces is
//! written here by the executor and read back through templates.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::common::{Error, Result};
use crate::http::HeaderSet;

use super::template::{self, TIMESTAMP};

/// State key holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Characters left unescaped when a value is spliced into a path
const PATH_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Per-run state: base URL, extracted values, run timestamp
#[derive(Debug, Clone)]
pub struct TestContext {
    base_url: String,
    state: BTreeMap<String, Value>,
    timestamp: u64,
}

impl TestContext {
    /// Create an empty context stamped with the current time
    pub fn new(base_url: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::with_timestamp(base_url, timestamp)
    }

    /// Create an empty context with a fixed run timestamp
    pub fn with_timestamp(base_url: impl Into<String>, timestamp: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            state: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
    }

    /// Read a state key; absence means the workflow is malformed
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.state.get(key).ok_or_else(|| Error::missing_state(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.contains_key(key)
    }

    /// Keys written so far, in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }

    /// Bearer auth plus JSON content type, or nothing before login
    pub fn auth_headers(&self) -> HeaderSet {
        let mut headers = HeaderSet::new();
        if let Some(token) = self.state.get(AUTH_TOKEN_KEY) {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", value_text(token)),
            );
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        headers
    }

    /// Text for a placeholder, built-ins included
    fn lookup_text(&self, name: &str) -> Result<String> {
        template::check_builtin(name)?;
        if name == TIMESTAMP {
            return Ok(self.timestamp.to_string());
        }
        self.get(name).map(value_text)
    }

    /// Substitute placeholders in a path template, percent-encoding values
    pub fn resolve_path(&self, path: &str) -> Result<String> {
        template::render(path, |name| {
            let text = self.lookup_text(name)?;
            Ok(utf8_percent_encode(&text, PATH_VALUE).to_string())
        })
    }

    /// Absolute URL for a path template
    pub fn url_for(&self, path: &str) -> Result<String> {
        let resolved = self.resolve_path(path)?;
        if resolved.starts_with('/') {
            Ok(format!("{}{}", self.base_url, resolved))
        } else {
            Ok(format!("{}/{}", self.base_url, resolved))
        }
    }

    /// Substitute placeholders throughout a JSON body template
    ///
    /// A string that is exactly one placeholder becomes the stored value with
    /// its JSON type intact; other strings are interpolated as text.
    pub fn resolve_body(&self, body: &Value) -> Result<Value> {
        match body {
            Value::String(text) => {
                if let Some(name) = template::sole_placeholder(text) {
                    template::check_builtin(name)?;
                    if name == TIMESTAMP {
                        return Ok(Value::from(self.timestamp));
                    }
                    return self.get(name).cloned();
                }
                template::render(text, |name| self.lookup_text(name)).map(Value::String)
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_body(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.resolve_body(value)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }
}

/// Plain text form of a JSON value: strings unquoted, everything else as JSON
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
