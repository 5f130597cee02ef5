use std::sync::Arc;

use rocksdb::TransactionDB;
use serde::Deserialize;
use serde::Serialize;

use crate::funnels::Funnels;
use crate::kv::Kv;
use crate::subscriptions::Subscriptions;

pub struct MetadataProvider {
    pub funnels: Arc<Funnels>,
    pub kv: Arc<Kv>,
    pub subscriptions: Arc<Subscriptions>,
}

impl MetadataProvider {
    pub fn new(db: Arc<TransactionDB>) -> Self {
        MetadataProvider {
            funnels: Arc::new(Funnels::new(db.clone())),
            kv: Arc::new(Kv::new(db.clone())),
            subscriptions: Arc::new(Subscriptions::new(db)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ResponseMetadata {
    pub next: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: ResponseMetadata,
}
