//! Cat fact lookup with a fixed fallback.
//!
//! A provider always yields a usable fact. Every way the upstream call can go
//! wrong is classified as a [`FactError`], logged, counted and replaced by
//! [`FALLBACK_FACT`].

use crate::config::FactSourceConfig;
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

pub const FALLBACK_FACT: &str =
    "A cat fact could not be retrieved at this moment, but cats rule the internet!";

/// Largest upstream body we are willing to buffer.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Why the upstream could not supply a fact.
#[derive(Debug, Error)]
pub enum FactError {
    #[error("fact source URL is not configured")]
    ConfigMissing,

    #[error("request to fact source failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("fact source returned status {0}")]
    UpstreamStatus(StatusCode),

    #[error("fact source returned a malformed body: {0}")]
    MalformedBody(String),

    #[error("fact source response has no usable `fact` field")]
    MissingField,
}

impl FactError {
    /// Stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FactError::ConfigMissing => "config_missing",
            FactError::Transport(_) => "transport",
            FactError::UpstreamStatus(_) => "upstream_status",
            FactError::MalformedBody(_) => "malformed_body",
            FactError::MissingField => "missing_field",
        }
    }
}

pub type FactOutcome = Result<String, FactError>;

/// Source of the `fact` field. Implementations never fail.
#[async_trait]
pub trait FactProvider: Send + Sync {
    async fn fetch_fact(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct FactPayload {
    #[serde(default)]
    fact: Option<String>,
}

/// Fetches facts from an HTTP JSON API shaped like `{"fact": "..."}`.
#[derive(Clone)]
pub struct HttpFactProvider {
    client: Client,
    config: FactSourceConfig,
}

impl HttpFactProvider {
    pub fn new(client: Client, config: FactSourceConfig) -> Self {
        Self { client, config }
    }

    /// One bounded attempt against the fact source, no retries.
    #[tracing::instrument(name = "fetch_cat_fact", skip(self))]
    pub async fn fetch(&self) -> FactOutcome {
        let url = match self.config.url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => return Err(FactError::ConfigMissing),
        };

        let response = self
            .client
            .traced_get(url)
            .header("accept", "application/json")
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(FactError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FactError::UpstreamStatus(status));
        }

        let body = read_body(response).await?;
        parse_fact(&body)
    }
}

/// Buffer the body, refusing anything over [`MAX_BODY_BYTES`].
async fn read_body(mut response: reqwest::Response) -> Result<Vec<u8>, FactError> {
    if let Some(len) = response.content_length() {
        if len > MAX_BODY_BYTES as u64 {
            return Err(body_too_large());
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(FactError::Transport)? {
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(body_too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

fn body_too_large() -> FactError {
    FactError::MalformedBody(format!("body exceeds {} bytes", MAX_BODY_BYTES))
}

#[async_trait]
impl FactProvider for HttpFactProvider {
    async fn fetch_fact(&self) -> String {
        match self.fetch().await {
            Ok(fact) => {
                counter!("fact_fetch_total", "outcome" => "ok").increment(1);
                fact
            }
            Err(e) => {
                let reason = e.reason();
                if matches!(e, FactError::ConfigMissing) {
                    tracing::debug!(reason, "No fact source configured, using fallback fact");
                } else {
                    tracing::warn!(
                        reason,
                        error = %e,
                        "Failed to fetch cat fact, using fallback fact"
                    );
                }
                counter!("fact_fetch_total", "outcome" => reason).increment(1);
                FALLBACK_FACT.to_string()
            }
        }
    }
}

/// Decode an upstream body. Anything but a JSON object is malformed; an
/// object whose `fact` is absent, null or empty has no usable fact.
fn parse_fact(body: &[u8]) -> FactOutcome {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FactError::MalformedBody(e.to_string()))?;

    if !value.is_object() {
        return Err(FactError::MalformedBody(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let payload: FactPayload =
        serde_json::from_value(value).map_err(|e| FactError::MalformedBody(e.to_string()))?;

    match payload.fact {
        Some(fact) if !fact.is_empty() => Ok(fact),
        _ => Err(FactError::MissingField),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fixed-answer provider for tests and local runs.
pub struct MockFactProvider {
    fact: String,
    call_count: AtomicU64,
}

impl MockFactProvider {
    pub fn new(fact: impl Into<String>) -> Self {
        Self {
            fact: fact.into(),
            call_count: AtomicU64::new(0),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactProvider for MockFactProvider {
    async fn fetch_fact(&self) -> String {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.fact.clone()
    }
}
