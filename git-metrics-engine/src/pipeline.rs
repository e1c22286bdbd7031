//! Three-stage ingestion pipeline: repositories → commits → enrichment,
//! with one upsert per fully enriched commit.
//!
//! Failure policy per stage:
//!   * Stage A (repository listing) is fatal and aborts the run.
//!   * Stage B (commit listing) skips the failing repository.
//!   * Stage C (detail, diffstat, date parse) skips the failing commit;
//!     a partial record is never written.
//!   * A failed upsert is logged and the run continues.

use chrono::{DateTime, Utc};
use commit_store::{CommitRecord, CommitStore};
use tracing::{debug, info, warn};

use crate::bitbucket::{BitbucketClient, BitbucketConfig};
use crate::errors::{IngestError, IngestResult};
use crate::fetcher::HttpFetcher;
use crate::model::{CommitDetails, CommitSummary, Repository, count_file_changes};

/// Everything the pipeline needs, built by the entry point. No hidden
/// globals: the fetch and store capabilities arrive as values.
#[derive(Debug)]
pub struct PipelineDeps<F, S> {
    pub fetcher: F,
    pub store: S,
    pub config: BitbucketConfig,
}

/// Run counters reported on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub repositories_seen: usize,
    pub repositories_skipped: usize,
    pub commits_upserted: usize,
    pub commits_skipped: usize,
    pub upsert_failures: usize,
}

/// Discovers every repository visible to the configured account and
/// persists an enriched record per commit, strictly sequentially and in
/// upstream order.
pub async fn fetch_and_save_commits<F, S>(deps: PipelineDeps<F, S>) -> IngestResult<IngestSummary>
where
    F: HttpFetcher,
    S: CommitStore,
{
    let PipelineDeps {
        fetcher,
        store,
        config,
    } = deps;
    let client = BitbucketClient::new(fetcher, config);

    // Stage A. The only fatal stage: without the listing there is no work.
    let repos = client
        .list_repositories()
        .await
        .map_err(|source| IngestError::RepoList { source })?;

    info!(count = repos.len(), "fetched repository listing");

    let mut summary = IngestSummary {
        repositories_seen: repos.len(),
        ..IngestSummary::default()
    };

    for repo in &repos {
        // Stage B. A repository whose commits cannot be listed is skipped.
        let commits = match client.list_commits(&repo.slug).await {
            Ok(commits) => commits,
            Err(source) => {
                let err = IngestError::CommitList {
                    slug: repo.slug.clone(),
                    source,
                };
                warn!(repo = %repo.slug, error = %err, "skipping repository");
                summary.repositories_skipped += 1;
                continue;
            }
        };

        debug!(repo = %repo.slug, count = commits.len(), "fetched commit listing");

        for commit in &commits {
            // Stage C. A commit that cannot be fully enriched is skipped;
            // a failed upsert is logged and the loop moves on.
            match process_commit(&client, &store, repo, commit, &mut summary).await {
                Ok(()) => {}
                Err(err) => {
                    warn!(
                        repo = %repo.slug,
                        hash = %commit.hash,
                        error = %err,
                        "skipping commit"
                    );
                    summary.commits_skipped += 1;
                }
            }
        }
    }

    if !repos.is_empty() && summary.repositories_skipped == repos.len() {
        return Err(IngestError::AllCommitListsFailed { total: repos.len() });
    }

    info!(
        repositories = summary.repositories_seen,
        upserted = summary.commits_upserted,
        skipped = summary.commits_skipped,
        upsert_failures = summary.upsert_failures,
        "ingestion run complete"
    );

    Ok(summary)
}

async fn process_commit<F, S>(
    client: &BitbucketClient<F>,
    store: &S,
    repo: &Repository,
    commit: &CommitSummary,
    summary: &mut IngestSummary,
) -> IngestResult<()>
where
    F: HttpFetcher,
    S: CommitStore,
{
    let mut details =
        client
            .get_commit(&repo.slug, &commit.hash)
            .await
            .map_err(|source| IngestError::CommitDetail {
                hash: commit.hash.clone(),
                source,
            })?;

    details.files = client
        .get_diffstat(&repo.slug, &commit.hash)
        .await
        .map_err(|source| IngestError::Diffstat {
            hash: commit.hash.clone(),
            source,
        })?;

    let record = build_record(repo, details)?;

    match store.upsert_commit(&record).await {
        Ok(()) => summary.commits_upserted += 1,
        Err(err) => {
            warn!(
                repo = %repo.slug,
                hash = %record.commit_id,
                error = %err,
                "failed to upsert commit"
            );
            summary.upsert_failures += 1;
        }
    }

    Ok(())
}

/// Builds the persisted document from a fully enriched commit. Optional
/// review metadata materializes as empty strings for schema stability.
fn build_record(repo: &Repository, details: CommitDetails) -> IngestResult<CommitRecord> {
    let date = parse_commit_date(&details.hash, &details.date)?;
    let counts = count_file_changes(&details.files);

    Ok(CommitRecord {
        commit_id: details.hash,
        commit_message: details.message,
        committed_by: details.author_display_name,
        commit_date: date,
        lines_added: details.lines_added,
        lines_deleted: details.lines_deleted,
        files_added: counts.files_added,
        files_deleted: counts.files_deleted,
        files_updated: counts.files_updated,
        repo_name: repo.name.clone(),
        project_name: repo.project_name.clone(),
        reviewed_by: details.reviewed_by_display_name.unwrap_or_default(),
        pull_request_id: details.pull_request_id.unwrap_or_default(),
    })
}

fn parse_commit_date(hash: &str, raw: &str) -> IngestResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| IngestError::BadDate {
            hash: hash.to_string(),
            raw: raw.to_string(),
            source,
        })
}
