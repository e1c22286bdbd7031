//! Crate-wide error hierarchy for git-metrics-engine.

use thiserror::Error;

pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Single HTTP fetch failure, produced by the [`crate::fetcher`] layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network/transport failure without an HTTP status (DNS, connect,
    /// reset, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-200 response; the body is captured up to a snippet cap for
    /// diagnostics.
    #[error("http status {status}: {body_snippet}")]
    HttpStatus { status: u16, body_snippet: String },

    /// Body was not valid JSON or did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Pipeline-level failure, tagged with the stage and upstream identifiers
/// needed to diagnose it from a single log line.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Stage A failed; the run aborts.
    #[error("failed to fetch repositories: {source}")]
    RepoList {
        #[source]
        source: FetchError,
    },

    /// Stage B failed for one repository; that repository is skipped.
    #[error("failed to fetch commits for repository '{slug}': {source}")]
    CommitList {
        slug: String,
        #[source]
        source: FetchError,
    },

    /// Stage C detail fetch failed for one commit; that commit is skipped.
    #[error("failed to fetch commit details for '{hash}': {source}")]
    CommitDetail {
        hash: String,
        #[source]
        source: FetchError,
    },

    /// Stage C diffstat fetch failed for one commit; no partial record is
    /// written.
    #[error("failed to fetch diffstat for '{hash}': {source}")]
    Diffstat {
        hash: String,
        #[source]
        source: FetchError,
    },

    /// The commit date did not parse as an RFC 3339 instant.
    #[error("invalid commit date '{raw}' for '{hash}': {source}")]
    BadDate {
        hash: String,
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Stage B failed for every repository the listing returned.
    #[error("commit listing failed for all {total} repositories")]
    AllCommitListsFailed { total: usize },
}
