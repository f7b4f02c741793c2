use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;

use crate::formatters;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("chart request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("chart service answered {status}: {excerpt}")]
    Rejected { status: u16, excerpt: String },
}

/// What to do with a response that is not a 2xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPolicy {
    /// Fail the run and leave any existing image untouched.
    #[default]
    RequireSuccess,
    /// Write the body whatever the status.
    WriteAny,
}

/// Raw answer of the charting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ChartResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Applies `policy`, yielding the bytes to persist.
    ///
    /// # Errors
    /// Returns [`ChartError::Rejected`] for a non-2xx status under
    /// [`ChartPolicy::RequireSuccess`].
    pub fn accept(self, policy: ChartPolicy) -> Result<Vec<u8>, ChartError> {
        if self.is_success() || policy == ChartPolicy::WriteAny {
            if !self.is_success() {
                log::warn!("chart service answered {}; writing body anyway", self.status);
            }
            return Ok(self.bytes);
        }
        let excerpt: String = String::from_utf8_lossy(&self.bytes).chars().take(200).collect();
        Err(ChartError::Rejected {
            status: self.status,
            excerpt,
        })
    }
}

/// Turns a chart description into image bytes.
pub trait ChartRenderer {
    /// # Errors
    /// Returns a [`ChartError`] if no response could be obtained.
    fn render(&self, chart: &Value) -> Result<ChartResponse, ChartError>;
}

/// quickchart.io style endpoint: POST `{"chart": ...}`, PNG back.
pub struct QuickChart {
    client: Client,
    endpoint: String,
}

impl QuickChart {
    /// # Errors
    /// Returns [`ChartError::Client`] if the TLS backend cannot be initialized.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ChartError> {
        let client = Client::builder()
            .user_agent(concat!("langstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ChartError::Client)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl ChartRenderer for QuickChart {
    fn render(&self, chart: &Value) -> Result<ChartResponse, ChartError> {
        let transport = |source: reqwest::Error| ChartError::Transport {
            url: self.endpoint.clone(),
            source,
        };
        let body = formatters::chart::envelope(chart.clone());
        log::debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(transport)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().map_err(transport)?.to_vec();
        log::debug!(
            "chart service answered {status} ({}, {} bytes)",
            content_type.as_deref().unwrap_or("no content type"),
            bytes.len()
        );
        Ok(ChartResponse {
            status,
            content_type,
            bytes,
        })
    }
}

/// Requests the image and writes it to `out` according to `policy`.
/// Returns the number of bytes written.
///
/// # Errors
/// Returns an error on transport failure, on a rejected response, or if the
/// file cannot be written.
pub fn save_chart(
    renderer: &dyn ChartRenderer,
    chart: &Value,
    policy: ChartPolicy,
    out: &Path,
) -> Result<usize> {
    let bytes = renderer.render(chart)?.accept(policy)?;
    fs::write(out, &bytes).with_context(|| format!("write chart: {}", out.display()))?;
    Ok(bytes.len())
}
