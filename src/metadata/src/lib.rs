pub mod error;
pub mod funnels;
pub mod index;
pub mod kv;
pub mod metadata;
pub mod rocksdb;
pub mod subscriptions;

use ::rocksdb::Transaction;
use ::rocksdb::TransactionDB;
pub use error::Result;
use serde::de::DeserializeOwned;

pub use crate::metadata::ListResponse;
pub use crate::metadata::MetadataProvider;
pub use crate::metadata::ResponseMetadata;

pub fn website_ns(website_id: &str, ns: &[u8]) -> Vec<u8> {
    [b"websites/", website_id.as_bytes(), b"/", ns].concat()
}

pub fn make_data_value_key(ns: &[u8], id: u64) -> Vec<u8> {
    [ns, b"/data/", id.to_string().as_bytes()].concat()
}

pub fn make_data_key(ns: &[u8]) -> Vec<u8> {
    [ns, b"/data/"].concat()
}

pub fn make_id_seq_key(ns: &[u8]) -> Vec<u8> {
    [ns, b"/id_seq"].concat()
}

pub fn list_data<T>(tx: &Transaction<TransactionDB>, ns: &[u8]) -> Result<Vec<T>>
where T: DeserializeOwned {
    let prefix = make_data_key(ns);

    let mut list = vec![];
    for kv in tx.prefix_iterator(prefix.clone()) {
        let (key, value) = kv?;
        // prefix iterator keeps going past the prefix
        if !key.starts_with(&prefix) {
            break;
        }
        list.push(bincode::deserialize(&value)?);
    }

    Ok(list)
}
