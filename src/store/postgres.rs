use async_trait::async_trait;

use crate::db::{self, DbPool, is_valid_identifier, models::Attributes};
use crate::error::BackendError;

use super::CounterStore;

/// Counters kept in one Postgres table, one row per date.
#[derive(Clone)]
pub struct PgCounterStore {
    pool: DbPool,
    table: String,
}

impl PgCounterStore {
    /// The table name is checked here so a bad name fails at startup.
    pub fn new(pool: DbPool, table: impl Into<String>) -> Result<Self, BackendError> {
        let table = table.into();
        if !is_valid_identifier(&table) {
            return Err(BackendError::Rejected(format!("invalid table name {table:?}")));
        }

        Ok(Self { pool, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn increment(&self, key: &str, field: &str) -> Result<(), BackendError> {
        if !is_valid_identifier(field) {
            return Err(BackendError::Rejected(format!("invalid field name {field:?}")));
        }

        db::increment_counter(&self.pool, &self.table, key, field).await?;

        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Option<Attributes>, BackendError> {
        Ok(db::get_counters(&self.pool, &self.table, key).await?)
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(db::ping(&self.pool).await?)
    }
}
