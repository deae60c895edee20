//! Counter backends.
//!
//! A backend offers exactly two primitives: an atomic "add one to a named
//! attribute" on a record identified by a partition key, creating record and
//! attribute on first use, and a point read of a whole record. All
//! correctness under concurrent writers rests on the first primitive, so
//! implementations must never emulate it with a read followed by a write.

mod memory;
mod postgres;

pub use memory::MemoryCounterStore;
pub use postgres::PgCounterStore;

use async_trait::async_trait;

use crate::db::models::Attributes;
use crate::error::BackendError;

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one to `field` of the record at `key`.
    async fn increment(&self, key: &str, field: &str) -> Result<(), BackendError>;

    /// Read the full record at `key`, `None` when it was never written.
    async fn fetch(&self, key: &str) -> Result<Option<Attributes>, BackendError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), BackendError>;
}
