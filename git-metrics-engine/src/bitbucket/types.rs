//! Bitbucket Cloud response shapes (subset; unknown fields ignored).

use serde::Deserialize;

/// Paged repository listing.
#[derive(Debug, Deserialize)]
pub(crate) struct RepoPage {
    #[serde(default)]
    pub values: Vec<RepoEntry>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepoEntry {
    pub name: String,
    pub slug: String,
    pub project: ProjectRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRef {
    pub name: String,
}

/// Paged commit listing.
#[derive(Debug, Deserialize)]
pub(crate) struct CommitPage {
    #[serde(default)]
    pub values: Vec<CommitEntry>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitEntry {
    pub hash: String,
    #[serde(default)]
    pub message: String,
    pub date: String,
    #[serde(default)]
    pub author: Option<AuthorRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthorRef {
    #[serde(default)]
    pub user: Option<UserRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRef {
    pub display_name: String,
}

/// Per-commit detail.
#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetailWire {
    pub hash: String,
    #[serde(default)]
    pub message: String,
    pub date: String,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub summary: Option<ChangeSummary>,
    #[serde(default)]
    pub reviewed_by: Option<AuthorRef>,
    #[serde(default)]
    pub pullrequest: Option<PullRequestRef>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChangeSummary {
    #[serde(default)]
    pub lines_added: u32,
    #[serde(default)]
    pub lines_deleted: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestRef {
    pub id: PullRequestId,
}

/// The provider serializes PR ids as numbers in some payloads and strings
/// in others; both normalize to a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PullRequestId {
    Text(String),
    Number(i64),
}

impl PullRequestId {
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Diffstat listing.
#[derive(Debug, Deserialize)]
pub(crate) struct DiffstatPage {
    #[serde(default)]
    pub values: Vec<DiffstatEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiffstatEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub path: Option<PathRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PathRef {
    #[serde(default)]
    pub to: String,
}
