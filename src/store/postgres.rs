//! src/store/postgres.rs

use crate::domain::SignupRecord;
use crate::store::{RemoteStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Writes signups straight into a Postgres table.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Table names cannot be bound as query parameters, so they are restricted
/// to plain identifiers before being spliced into the statement.
fn checked_table_name(table: &str) -> Result<&str, StoreError> {
    let is_identifier = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if is_identifier {
        Ok(table)
    } else {
        Err(StoreError::new(format!("`{}` is not a valid table name.", table)))
    }
}

/// Reduce a sqlx error to the message the database reported.
fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => StoreError::new(db_err.message()),
        _ => StoreError::new(err.to_string()),
    }
}

#[async_trait]
impl RemoteStore for PostgresStore {
    #[tracing::instrument(
        name = "Saving new signup in the database.",
        skip(self, record),
        fields(signup_email = %record.email())
    )]
    async fn insert(&self, table: &str, record: &SignupRecord) -> Result<(), StoreError> {
        let table = checked_table_name(table)?;
        let query = format!(
            r#"INSERT INTO {} (id, first_name, email, created_at) VALUES ($1, $2, $3, $4)"#,
            table
        );
        sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(record.first_name())
            .bind(record.email())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    #[tracing::instrument(name = "Checking database connection.", skip(self))]
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
