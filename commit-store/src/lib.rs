//! Commit persistence behind a narrow upsert capability.
//!
//! This facade concentrates all MongoDB interaction behind one operation so
//! the ingestion pipeline stays decoupled from the driver and testable with
//! an in-memory double.

pub mod errors;

use std::future::Future;

use bson::doc;
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{CommitStoreError, Result};

const DATABASE: &str = "bitbucket_metrics";
const COLLECTION: &str = "commits";

/// The persisted commit document. Field names are the collection schema and
/// must stay stable for downstream dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub commit_id: String,
    pub commit_message: String,
    pub committed_by: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub commit_date: DateTime<Utc>,
    pub lines_added: u32,
    pub lines_deleted: u32,
    pub files_added: u32,
    pub files_deleted: u32,
    pub files_updated: u32,
    pub repo_name: String,
    pub project_name: String,
    /// Empty when the commit carries no review metadata.
    pub reviewed_by: String,
    /// Empty when the commit is not associated with a pull request.
    pub pull_request_id: String,
}

/// Storage capability used by the ingestion pipeline.
///
/// Contract: locate the document with `commit_id = record.commit_id`;
/// overwrite its fields if present, insert otherwise.
pub trait CommitStore {
    fn upsert_commit(&self, record: &CommitRecord) -> impl Future<Output = Result<()>>;
}

/// MongoDB-backed [`CommitStore`].
#[derive(Debug, Clone)]
pub struct MongoCommitStore {
    collection: Collection<CommitRecord>,
}

impl MongoCommitStore {
    /// Connects to the datastore, verifies it is reachable and ensures the
    /// unique index on `commit_id`. Called once at startup; the client is
    /// reused for the whole run.
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| CommitStoreError::Connect(e.to_string()))?;

        let db = client.database(DATABASE);

        // Fail fast on an unreachable server instead of at the first write.
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| CommitStoreError::Connect(e.to_string()))?;

        let collection = db.collection::<CommitRecord>(COLLECTION);

        let index = IndexModel::builder()
            .keys(doc! { "commit_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index)
            .await
            .map_err(|e| CommitStoreError::Index(e.to_string()))?;

        info!(database = DATABASE, collection = COLLECTION, "datastore ready");

        Ok(Self { collection })
    }
}

impl CommitStore for MongoCommitStore {
    async fn upsert_commit(&self, record: &CommitRecord) -> Result<()> {
        let update = doc! { "$set": bson::to_document(record)? };

        let result = self
            .collection
            .update_one(doc! { "commit_id": &record.commit_id }, update)
            .upsert(true)
            .await
            .map_err(|e| CommitStoreError::Upsert(e.to_string()))?;

        debug!(
            commit_id = %record.commit_id,
            matched = result.matched_count,
            modified = result.modified_count,
            "upserted commit"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> CommitRecord {
        CommitRecord {
            commit_id: "abc123".into(),
            commit_message: "Initial commit".into(),
            committed_by: "User1".into(),
            commit_date: Utc.with_ymd_and_hms(2024, 7, 16, 10, 28, 45).unwrap(),
            lines_added: 10,
            lines_deleted: 2,
            files_added: 1,
            files_deleted: 1,
            files_updated: 1,
            repo_name: "repo1".into(),
            project_name: "Project1".into(),
            reviewed_by: String::new(),
            pull_request_id: String::new(),
        }
    }

    #[test]
    fn document_field_names_are_stable() {
        let doc = bson::to_document(&sample_record()).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "commit_id",
                "commit_message",
                "committed_by",
                "commit_date",
                "lines_added",
                "lines_deleted",
                "files_added",
                "files_deleted",
                "files_updated",
                "repo_name",
                "project_name",
                "reviewed_by",
                "pull_request_id",
            ]
        );
    }

    #[test]
    fn commit_date_is_a_bson_datetime() {
        let doc = bson::to_document(&sample_record()).unwrap();
        assert!(matches!(
            doc.get("commit_date"),
            Some(bson::Bson::DateTime(_))
        ));
    }

    #[test]
    fn absent_review_metadata_is_an_empty_string() {
        let doc = bson::to_document(&sample_record()).unwrap();
        assert_eq!(doc.get_str("reviewed_by").unwrap(), "");
        assert_eq!(doc.get_str("pull_request_id").unwrap(), "");
    }

    #[test]
    fn record_round_trips_through_bson() {
        let record = sample_record();
        let doc = bson::to_document(&record).unwrap();
        let back: CommitRecord = bson::from_document(doc).unwrap();
        assert_eq!(back, record);
    }
}
