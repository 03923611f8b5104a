// ============================================================================
// Order Store - Repository abstraction
// ============================================================================
//
// Contract required by the order core:
// 1. fetch-by-id with read-after-write consistency
// 2. insert, assigning a fresh id
// 3. compare-and-swap keyed on the version counter, atomic with the write
// 4. predicate-filtered, paginated scan with a total match count
//
// Backends:
// - memory   - in-process store (tests, local runs without a database)
// - postgres - sqlx/Postgres store
//
// ============================================================================

mod memory;
mod postgres;
mod query;

use async_trait::async_trait;

use crate::domain::order::{NewOrder, Order, OrderId};
use crate::utils::IsTransient;

pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use query::{OrderPredicate, OrderQuery, ScanResult};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl IsTransient for StoreError {
    fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(err) => matches!(
                err,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
            ),
            StoreError::Unavailable(_) => true,
        }
    }
}

/// Outcome of a conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum SwapOutcome {
    /// The expected version was current; carries the persisted record.
    Swapped(Order),
    /// Another writer advanced the version first. Nothing was written.
    VersionMismatch,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn fetch(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Insert a new order at version 1 and return it with its assigned id.
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Replace the stored order if its version still equals `order.version`.
    ///
    /// On success the persisted version is `order.version + 1`.
    async fn compare_and_swap(&self, order: &Order) -> Result<SwapOutcome, StoreError>;

    /// Orders matching every predicate, ascending by id, windowed by the
    /// query's offset and limit.
    async fn scan(&self, query: &OrderQuery) -> Result<ScanResult, StoreError>;
}
