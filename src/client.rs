//! Shared HTTP client for the Gemini endpoints.
//!
//! [`GeminiClient`] only holds the connection pool and the API base URL. The
//! API key is passed per call because it belongs to the [`crate::Settings`]
//! of the invocation, not to the client.

use crate::error::Pdf2MdError;
use tracing::debug;

/// Public Gemini API host.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Connection pool plus base URL for the upload and generation endpoints.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Client for the public Gemini API.
    pub fn new() -> Result<Self, Pdf2MdError> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Client for a custom host (proxies, mock servers in tests).
    ///
    /// No request timeout is set; a stalled server stalls the conversion.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, Pdf2MdError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gemini-pdf2md/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Pdf2MdError::Unexpected(format!("HTTP client: {e}")))?;
        Ok(Self::from_parts(http, base_url))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_parts(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!("Gemini API base: {}", base_url);
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for an API path such as `/v1beta/models/x:generateContent`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read an error response body for display, never failing.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read response body: {e}>"))
}
