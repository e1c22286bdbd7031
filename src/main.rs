use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, anyhow};
use commit_store::MongoCommitStore;
use git_metrics_engine::{
    BitbucketConfig, IngestSummary, PipelineDeps, ReqwestFetcher, fetch_and_save_commits,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file when present (local runs).
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Log records go to stderr; stdout is reserved for the completion line.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(summary) => {
            println!(
                "successfully fetched and saved commit data: {} commits across {} repositories",
                summary.commits_upserted, summary.repositories_seen
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<IngestSummary> {
    let config = secret_config::load_config()
        .await
        .context("error loading config")?;

    let store = MongoCommitStore::connect(&config.mongodb_uri)
        .await
        .context("error initializing mongodb")?;

    let fetcher = ReqwestFetcher::new(Duration::from_secs(config.request_timeout_secs))
        .context("error building http client")?;

    let deps = PipelineDeps {
        fetcher,
        store,
        config: BitbucketConfig {
            username: config.bitbucket_username,
            token: config.bitbucket_access_token,
            repo_url_template: config.repo_url_template,
            commits_url_template: config.commits_url_template,
            commit_url_template: config.commit_url_template,
            diffstat_url_template: config.diffstat_url_template,
        },
    };

    tokio::select! {
        res = fetch_and_save_commits(deps) => {
            res.context("error fetching and saving commits")
        }
        _ = tokio::signal::ctrl_c() => Err(anyhow!("run cancelled by signal")),
    }
}
