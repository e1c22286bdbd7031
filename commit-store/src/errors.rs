use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommitStoreError>;

#[derive(Debug, Error)]
pub enum CommitStoreError {
    /// Connection URI invalid or server unreachable at startup. Fatal.
    #[error("failed to connect to datastore: {0}")]
    Connect(String),

    #[error("failed to ensure commit index: {0}")]
    Index(String),

    #[error("failed to serialize commit record: {0}")]
    Serialize(#[from] bson::ser::Error),

    /// A single write failed; the run continues with the next commit.
    #[error("failed to upsert commit: {0}")]
    Upsert(String),
}
