pub mod db;
pub mod error;
pub mod filter;
pub mod memory;
pub mod record;

use async_trait::async_trait;
pub use db::RocksStore;
pub use error::Result;
pub use error::StoreError;
pub use filter::Condition;
pub use filter::Filter;
pub use memory::MemoryStore;
pub use record::Collection;
pub use record::Field;
pub use record::Record;
pub use record::Row;
pub use record::Value;

pub const METRIC_STORE_QUERIES_TOTAL: &str = "store.queries_total";
pub const METRIC_STORE_INSERTS_TOTAL: &str = "store.inserts_total";

/// Append-only event log shared by ingestion (writer) and reporting (reader).
///
/// Every call observes whatever is visible at the time it runs; there is no snapshot
/// shared between calls.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert(&self, record: Record) -> Result<()>;

    /// Returns projected rows of `collection` matching every condition of `filter`.
    /// An empty `select` returns all fields.
    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        select: &[Field],
    ) -> Result<Vec<Row>>;
}
