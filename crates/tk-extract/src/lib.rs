//! Document text extraction for the report ingestion engine.
//!
//! The engine treats extraction as a black box that returns positioned text
//! fragments per page. This crate provides the two sources the CLI uses:
//! - [`Client`]: an HTTP client for an extraction service that renders
//!   document bytes into fragments;
//! - [`FragmentFile`]: an offline source that decodes a pre-extracted
//!   fragment dump (the same JSON shape the service returns).

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use tk_core::{Page, PageSource, TextFragment};

/// Default request timeout for extraction calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Extraction client errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The configured endpoint was unusable.
    #[error("invalid extractor endpoint: {reason}")]
    InvalidEndpoint { reason: &'static str },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service returned an error response.
    #[error("extraction service error: {message}")]
    Api { message: String },
    /// The response body could not be decoded into pages.
    #[error("invalid extraction response: {0}")]
    InvalidResponse(String),
}

/// HTTP client for the extraction service.
///
/// Safe to clone and share; clones reuse the underlying connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the given service endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ExtractError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ExtractError::InvalidEndpoint {
                reason: "endpoint cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ExtractError::ClientBuild)?;

        Ok(Self { http, endpoint })
    }

    /// Sends document bytes to the service and decodes the extracted pages.
    pub async fn extract(&self, bytes: &[u8]) -> Result<Vec<Page>, ExtractError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| ExtractError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        pages_from_json(&body)
    }
}

impl PageSource for Client {
    type Error = ExtractError;

    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Page>, Self::Error> {
        self.extract(bytes).await
    }
}

/// Offline page source: the ingested bytes are themselves a fragment dump.
///
/// Used for pre-extracted documents and in tests; performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentFile;

impl PageSource for FragmentFile {
    type Error = ExtractError;

    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Page>, Self::Error> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| ExtractError::InvalidResponse(err.to_string()))?;
        pages_from_json(text)
    }
}

#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    pages: Vec<PagePayload>,
}

#[derive(Debug, Deserialize)]
struct PagePayload {
    #[serde(default)]
    fragments: Vec<FragmentPayload>,
}

#[derive(Debug, Deserialize)]
struct FragmentPayload {
    text: String,
    x: f64,
    y: f64,
}

/// Decodes the service's `{"pages":[{"fragments":[..]}]}` shape.
pub fn pages_from_json(text: &str) -> Result<Vec<Page>, ExtractError> {
    let payload: ExtractionPayload =
        serde_json::from_str(text).map_err(|err| ExtractError::InvalidResponse(err.to_string()))?;

    Ok(payload
        .pages
        .into_iter()
        .map(|page| Page {
            fragments: page
                .fragments
                .into_iter()
                .map(|fragment| TextFragment {
                    text: fragment.text,
                    x: fragment.x,
                    y: fragment.y,
                })
                .collect(),
        })
        .collect())
}

fn parse_api_error(body: &str) -> Option<ExtractError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| ExtractError::Api {
            message: payload.error.message,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_empty_endpoint() {
        assert!(matches!(
            Client::new(""),
            Err(ExtractError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            Client::new("   "),
            Err(ExtractError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn client_accepts_valid_endpoint() {
        assert!(Client::new("http://localhost:8700/extract").is_ok());
    }

    #[test]
    fn pages_from_json_decodes_fragments() {
        let input = r#"{
            "pages": [
                {"fragments": [
                    {"text": "Ana Silva", "x": 10.0, "y": 800.0},
                    {"text": "01:30:00", "x": 400.0, "y": 800.0}
                ]},
                {"fragments": []}
            ]
        }"#;
        let pages = pages_from_json(input).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].fragments.len(), 2);
        assert_eq!(pages[0].fragments[0].text, "Ana Silva");
        assert!((pages[0].fragments[1].x - 400.0).abs() < f64::EPSILON);
        assert!(pages[1].fragments.is_empty());
    }

    #[test]
    fn pages_from_json_tolerates_missing_fragment_lists() {
        let pages = pages_from_json(r#"{"pages":[{}]}"#).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].fragments.is_empty());
    }

    #[test]
    fn pages_from_json_rejects_malformed_payloads() {
        assert!(matches!(
            pages_from_json("not-json"),
            Err(ExtractError::InvalidResponse(_))
        ));
        assert!(matches!(
            pages_from_json(r#"{"pages": "nope"}"#),
            Err(ExtractError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parse_api_error_extracts_service_message() {
        let err = parse_api_error(r#"{"error":{"message":"unsupported media type"}}"#).unwrap();
        match err {
            ExtractError::Api { message } => assert_eq!(message, "unsupported media type"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_api_error("plain text").is_none());
    }

    #[tokio::test]
    async fn fragment_file_decodes_dump_bytes() {
        let bytes = br#"{"pages":[{"fragments":[{"text":"x","x":1.0,"y":2.0}]}]}"#;
        let pages = FragmentFile.extract_pages(bytes).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].fragments[0].text, "x");
    }

    #[tokio::test]
    async fn fragment_file_rejects_non_utf8_bytes() {
        let err = FragmentFile.extract_pages(&[0xff, 0xfe]).await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidResponse(_)));
    }
}
