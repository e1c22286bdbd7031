//! Authenticated JSON GET capability over the provider API.
//!
//! The pipeline is generic over [`HttpFetcher`] so tests can script
//! responses without a network; [`ReqwestFetcher`] is the production
//! implementation. One invocation is exactly one network call: retries,
//! backoff and rate-limit handling are deliberately absent — adding them
//! here would silently change the failure model the pipeline relies on.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::FetchError;

/// Cap on the response-body excerpt carried in status errors.
const BODY_SNIPPET_MAX: usize = 512;

/// Narrow capability: issue one authenticated GET and decode the JSON body
/// into a caller-supplied shape. No state between calls.
pub trait HttpFetcher {
    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<T, FetchError>>;
}

/// Production fetcher over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    /// Builds the shared HTTP client with a stable user agent and the
    /// per-request deadline. Constructed once at startup and reused.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent("bitbucket-metrics/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<T, FetchError>> {
        let request = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {bearer_token}"));
        let url = url.to_string();

        async move {
            debug!(%url, "GET");

            let response = request.send().await?;
            let status = response.status();

            if status != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    body_snippet: snippet(&body),
                });
            }

            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
        }
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_MAX).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_caps_long_bodies() {
        let body = "x".repeat(BODY_SNIPPET_MAX * 2);
        assert_eq!(snippet(&body).len(), BODY_SNIPPET_MAX);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn status_error_display_carries_status_and_body() {
        let err = FetchError::HttpStatus {
            status: 401,
            body_snippet: r#"{"type":"error"}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains(r#"{"type":"error"}"#));
    }
}
