//! HTTP client trait and its reqwest implementation

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::common::config::Config;
use crate::common::{Error, Result, TransportError};

use super::types::{HttpRequest, HttpResponse};

/// Sends one request and returns whatever the server answered
///
/// Any HTTP status is a response; only failing to get one is an error.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Production client backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("expense-e2e/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::HttpClientBuild(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.request_timeout(), config.connect_timeout())
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let started = Instant::now();
        let mut builder = self.client.request(request.method.into(), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %request.url, "sending request");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!(
            method = %request.method,
            url = %request.url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received response"
        );

        Ok(HttpResponse::from_text(status, text))
    }
}
