use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart::Form, Client, StatusCode};
use shared::{domain::SubmissionPayload, protocol::ANALYZE_PATH};
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// Settled HTTP exchange: status plus the raw, not yet decoded body.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TransportReply {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Sends one analysis request. Non-success statuses are returned as a
    /// reply, only failures to complete the exchange are errors.
    async fn post_analysis(&self, payload: &SubmissionPayload)
        -> Result<TransportReply, TransportError>;
}

pub struct HttpAnalysisTransport {
    http: Client,
    endpoint: Url,
}

impl HttpAnalysisTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(server_url, None)
    }

    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let endpoint = analyze_endpoint(server_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(TransportError::ClientBuild)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisTransport for HttpAnalysisTransport {
    async fn post_analysis(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<TransportReply, TransportError> {
        let form = payload
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let res = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = res.status();
        let body = res.bytes().await?;
        debug!(%status, body_len = body.len(), "analysis response received");
        Ok(TransportReply::new(status, body.to_vec()))
    }
}

/// Resolves the fixed analysis path against the service root, keeping any
/// path prefix the root already carries.
pub fn analyze_endpoint(server_url: &str) -> Result<Url, TransportError> {
    let raw = format!("{}{}", server_url.trim().trim_end_matches('/'), ANALYZE_PATH);
    Url::parse(&raw).map_err(|source| TransportError::InvalidEndpoint { url: raw, source })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
