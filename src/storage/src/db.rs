use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use rocksdb::Options;
use rocksdb::DB;
use tokio::task;
use tracing::trace;

use crate::error::Result;
use crate::error::StoreError;
use crate::filter::Filter;
use crate::record::Collection;
use crate::record::Field;
use crate::record::Record;
use crate::record::Row;
use crate::Store;
use crate::METRIC_STORE_INSERTS_TOTAL;
use crate::METRIC_STORE_QUERIES_TOTAL;

fn collection_prefix(collection: Collection) -> Vec<u8> {
    [collection.as_str().as_bytes(), b"/"].concat()
}

fn website_prefix(collection: Collection, website: &str) -> Vec<u8> {
    [collection_prefix(collection).as_slice(), website.as_bytes(), b"/"].concat()
}

fn make_record_key(record: &Record) -> Vec<u8> {
    [
        website_prefix(record.collection(), record.website()).as_slice(),
        record.id().as_bytes(),
    ]
    .concat()
}

/// Rocksdb backed log. Records are bincode encoded under `<collection>/<website>/<id>`.
pub struct RocksStore {
    db: Arc<DB>,
}

impl RocksStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        Ok(Self {
            db: Arc::new(DB::open(&opts, path)?),
        })
    }
}

fn scan(db: &DB, prefix: &[u8], filter: &Filter, select: &[Field]) -> Result<Vec<Row>> {
    let mut rows = vec![];
    for kv in db.prefix_iterator(prefix) {
        let (key, value) = kv?;
        if !key.starts_with(prefix) {
            break;
        }
        let record: Record = bincode::deserialize(&value)?;
        if filter.matches(&record) {
            rows.push(Row::project(&record, select));
        }
    }

    Ok(rows)
}

#[async_trait]
impl Store for RocksStore {
    async fn insert(&self, record: Record) -> Result<()> {
        if record.website().contains('/') {
            return Err(StoreError::InvalidParameter(format!(
                "website {:?} must not contain '/'",
                record.website()
            )));
        }
        counter!(METRIC_STORE_INSERTS_TOTAL, "collection" => record.collection().as_str())
            .increment(1);

        let db = self.db.clone();
        task::spawn_blocking(move || -> Result<()> {
            let data = bincode::serialize(&record)?;
            db.put(make_record_key(&record), data)?;
            Ok(())
        })
        .await?
    }

    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        select: &[Field],
    ) -> Result<Vec<Row>> {
        counter!(METRIC_STORE_QUERIES_TOTAL, "collection" => collection.as_str()).increment(1);
        let prefix = match filter.equal_value(Field::Website) {
            Some(website) => website_prefix(collection, website),
            None => collection_prefix(collection),
        };
        trace!("scan prefix {:?}", String::from_utf8_lossy(&prefix));

        let db = self.db.clone();
        let filter = filter.clone();
        let select = select.to_vec();
        task::spawn_blocking(move || scan(&db, &prefix, &filter, &select)).await?
    }
}
