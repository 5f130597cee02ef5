use std::collections::HashMap;

use async_trait::async_trait;
use metrics::counter;
use parking_lot::RwLock;

use crate::error::Result;
use crate::filter::Filter;
use crate::record::Collection;
use crate::record::Field;
use crate::record::Record;
use crate::record::Row;
use crate::Store;
use crate::METRIC_STORE_INSERTS_TOTAL;
use crate::METRIC_STORE_QUERIES_TOTAL;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.read().values().all(|v| v.is_empty())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, record: Record) -> Result<()> {
        counter!(METRIC_STORE_INSERTS_TOTAL, "collection" => record.collection().as_str())
            .increment(1);
        self.collections
            .write()
            .entry(record.collection())
            .or_default()
            .push(record);

        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        select: &[Field],
    ) -> Result<Vec<Row>> {
        counter!(METRIC_STORE_QUERIES_TOTAL, "collection" => collection.as_str()).increment(1);
        let guard = self.collections.read();
        let rows = match guard.get(&collection) {
            None => vec![],
            Some(records) => records
                .iter()
                .filter(|r| filter.matches(r))
                .map(|r| Row::project(r, select))
                .collect(),
        };

        Ok(rows)
    }
}
