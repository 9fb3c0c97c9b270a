//! src/store/mod.rs

mod postgres;
mod rest;

pub use postgres::PostgresStore;
pub use rest::RestStore;

use crate::domain::SignupRecord;
use async_trait::async_trait;

/// Substring the hosted store puts into unique constraint violations.
pub const DUPLICATE_KEY_MARKER: &str = "duplicate key value";

/// Failure of a remote insert, carrying the message the store reported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        self.message.contains(DUPLICATE_KEY_MARKER)
    }
}

/// Capability of a hosted row store used by the signup workflow.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Append one row to `table`.
    async fn insert(&self, table: &str, record: &SignupRecord) -> Result<(), StoreError>;

    /// Check that the store can be reached. Used once while bootstrapping.
    async fn ping(&self) -> Result<(), StoreError>;
}
