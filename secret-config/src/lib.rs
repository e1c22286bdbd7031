//! Job configuration loaded from AWS Secrets Manager.
//!
//! The whole configuration (provider credentials, datastore URI, URL
//! templates) lives in one JSON secret. Retrieval uses the ambient AWS
//! credential chain; any failure here is fatal to the run.

pub mod errors;

use aws_config::BehaviorVersion;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{ConfigError, Result};

/// Name of the secret holding the job configuration.
const SECRET_NAME: &str = "bitbucket_metrics";

/// Decoded secret payload. Unknown fields in the secret are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Account identifier substituted into the URL templates.
    pub bitbucket_username: String,
    pub bitbucket_access_token: String,
    pub mongodb_uri: String,
    pub region: String,
    pub repo_url_template: String,
    pub commits_url_template: String,
    pub commit_url_template: String,
    pub diffstat_url_template: String,
    /// Per-request deadline for provider calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Decodes a raw secret payload. Factored out of [`load_config`] so the
    /// payload contract can be exercised without a live secret store.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Fetches and decodes the `bitbucket_metrics` secret.
pub async fn load_config() -> Result<Config> {
    let aws_cfg = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = aws_sdk_secretsmanager::Client::new(&aws_cfg);

    debug!(secret = SECRET_NAME, "retrieving job configuration");

    let output = client
        .get_secret_value()
        .secret_id(SECRET_NAME)
        .send()
        .await
        .map_err(|e| ConfigError::Retrieve(e.to_string()))?;

    let payload = output.secret_string().ok_or(ConfigError::EmptySecret)?;
    Config::from_json(payload)
}
