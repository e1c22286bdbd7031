//! Bitbucket Cloud provider (REST v2) for repositories, commits and
//! diffstats.
//!
//! Endpoints are not hard-coded; the job receives four URL templates from
//! configuration and fills their `{placeholder}` segments positionally:
//!   * repositories:   template(username)
//!   * commits:        template(username, repo_slug)
//!   * commit detail:  template(username, repo_slug, commit_hash)
//!   * diffstat:       template(username, repo_slug, commit_hash)

mod types;

use tracing::debug;

use crate::errors::FetchError;
use crate::fetcher::HttpFetcher;
use crate::model::{CommitDetails, CommitSummary, FileChange, FileChangeKind, Repository};
use types::*;

/// Provider configuration injected by the entry point.
#[derive(Debug, Clone)]
pub struct BitbucketConfig {
    /// Account identifier substituted into every template.
    pub username: String,
    /// Opaque bearer token for the `Authorization` header.
    pub token: String,
    pub repo_url_template: String,
    pub commits_url_template: String,
    pub commit_url_template: String,
    pub diffstat_url_template: String,
}

/// Bitbucket HTTP client wrapper, generic over the fetch capability.
#[derive(Debug, Clone)]
pub struct BitbucketClient<F> {
    fetcher: F,
    cfg: BitbucketConfig,
}

impl<F: HttpFetcher> BitbucketClient<F> {
    pub fn new(fetcher: F, cfg: BitbucketConfig) -> Self {
        debug!(username = %cfg.username, "creating BitbucketClient");
        Self { fetcher, cfg }
    }

    /// Lists every repository visible to the account, following page links
    /// until the listing is exhausted.
    pub async fn list_repositories(&self) -> Result<Vec<Repository>, FetchError> {
        let mut repos = Vec::new();
        let mut url = Some(fill_template(
            &self.cfg.repo_url_template,
            &[&self.cfg.username],
        ));

        while let Some(u) = url {
            debug!(url = %u, "bitbucket list_repositories page");

            let page: RepoPage = self.fetcher.get_json(&u, &self.cfg.token).await?;

            repos.extend(page.values.into_iter().map(|r| Repository {
                name: r.name,
                slug: r.slug,
                project_name: r.project.name,
            }));

            url = page.next;
        }

        Ok(repos)
    }

    /// Lists the commits of one repository in upstream order, following
    /// page links.
    pub async fn list_commits(&self, repo_slug: &str) -> Result<Vec<CommitSummary>, FetchError> {
        let mut commits = Vec::new();
        let mut url = Some(fill_template(
            &self.cfg.commits_url_template,
            &[&self.cfg.username, repo_slug],
        ));

        while let Some(u) = url {
            debug!(url = %u, "bitbucket list_commits page");

            let page: CommitPage = self.fetcher.get_json(&u, &self.cfg.token).await?;

            commits.extend(page.values.into_iter().map(|c| CommitSummary {
                hash: c.hash,
                message: c.message,
                date: c.date,
                author_display_name: display_name(c.author),
            }));

            url = page.next;
        }

        Ok(commits)
    }

    /// Fetches the enriched detail of one commit. Diffstat entries are
    /// merged in separately by the pipeline ([`Self::get_diffstat`]).
    pub async fn get_commit(
        &self,
        repo_slug: &str,
        commit_hash: &str,
    ) -> Result<CommitDetails, FetchError> {
        let url = fill_template(
            &self.cfg.commit_url_template,
            &[&self.cfg.username, repo_slug, commit_hash],
        );
        debug!(%url, "bitbucket get_commit");

        let wire: CommitDetailWire = self.fetcher.get_json(&url, &self.cfg.token).await?;
        let summary = wire.summary.unwrap_or_default();

        Ok(CommitDetails {
            hash: wire.hash,
            message: wire.message,
            date: wire.date,
            author_display_name: display_name(wire.author),
            lines_added: summary.lines_added,
            lines_deleted: summary.lines_deleted,
            files: Vec::new(),
            reviewed_by_display_name: wire
                .reviewed_by
                .and_then(|r| r.user)
                .map(|u| u.display_name),
            pull_request_id: wire.pullrequest.map(|pr| pr.id.into_string()),
        })
    }

    /// Fetches the per-file change summary of one commit.
    pub async fn get_diffstat(
        &self,
        repo_slug: &str,
        commit_hash: &str,
    ) -> Result<Vec<FileChange>, FetchError> {
        let url = fill_template(
            &self.cfg.diffstat_url_template,
            &[&self.cfg.username, repo_slug, commit_hash],
        );
        debug!(%url, "bitbucket get_diffstat");

        let page: DiffstatPage = self.fetcher.get_json(&url, &self.cfg.token).await?;

        Ok(page
            .values
            .into_iter()
            .map(|entry| FileChange {
                kind: FileChangeKind::parse(&entry.kind),
                path: entry.path.map(|p| p.to).unwrap_or_default(),
            })
            .collect())
    }
}

fn display_name(author: Option<AuthorRef>) -> String {
    author
        .and_then(|a| a.user)
        .map(|u| u.display_name)
        .unwrap_or_default()
}

/// Substitutes `{placeholder}` segments positionally with the given
/// arguments. Placeholders beyond the argument list are left untouched.
fn fill_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut args = args.iter();

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        match rest[start..].find('}') {
            Some(end_rel) => {
                let end = start + end_rel;
                match args.next() {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str(&rest[start..=end]),
                }
                rest = &rest[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
