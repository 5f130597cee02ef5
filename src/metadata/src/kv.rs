use std::sync::Arc;

use bincode::deserialize;
use bincode::serialize;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use rocksdb::ErrorKind;
use rocksdb::TransactionDB;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::MetadataError;
use crate::Result;

const NAMESPACE: &[u8] = b"kv/";

fn make_key(key: &str) -> Vec<u8> {
    [NAMESPACE, key.as_bytes()].concat()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
struct Entry {
    // unix millis, None means the entry never expires
    expires_at: Option<i64>,
    value: Vec<u8>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|ts| ts <= now.timestamp_millis())
    }
}

fn decode_counter(entry: Entry) -> Result<u64> {
    let bytes: [u8; 8] = entry
        .value
        .try_into()
        .map_err(|_| MetadataError::Internal("corrupted counter value".to_string()))?;

    Ok(u64::from_le_bytes(bytes))
}

fn expiration(now: DateTime<Utc>, ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|ttl| (now + ttl).timestamp_millis())
}

// contention on a locked key is reported by rocksdb as one of these
fn is_contention(err: &rocksdb::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Busy | ErrorKind::TryAgain | ErrorKind::TimedOut
    )
}

/// Expiring key-value entries used as a response cache and for cross-request locks.
pub struct Kv {
    db: Arc<TransactionDB>,
}

impl Kv {
    pub fn new(db: Arc<TransactionDB>) -> Self {
        Kv { db }
    }

    pub fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.set_at(key, value, ttl, Utc::now())
    }

    pub(crate) fn set_at(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = Entry {
            expires_at: expiration(now, ttl),
            value: value.to_vec(),
        };
        let tx = self.db.transaction();
        tx.put(make_key(key), serialize(&entry)?)?;
        tx.commit()?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get_at(key, Utc::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Vec<u8>>> {
        let tx = self.db.transaction();
        let entry: Entry = match tx.get(make_key(key))? {
            None => return Ok(None),
            Some(v) => deserialize(&v)?,
        };

        if entry.is_expired(now) {
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    /// Value of the counter stored under `key`, 0 if it was never incremented.
    pub fn counter(&self, key: &str) -> Result<u64> {
        let tx = self.db.transaction();
        match tx.get(make_key(key))? {
            None => Ok(0),
            Some(v) => decode_counter(deserialize(&v)?),
        }
    }

    /// Increments the counter stored under `key` and returns the new value.
    pub fn incr(&self, key: &str) -> Result<u64> {
        let tx = self.db.transaction();
        let k = make_key(key);
        let value = match tx.get_for_update(&k, true)? {
            None => 1,
            Some(v) => decode_counter(deserialize(&v)?)? + 1,
        };

        let entry = Entry {
            expires_at: None,
            value: value.to_le_bytes().to_vec(),
        };
        tx.put(&k, serialize(&entry)?)?;
        tx.commit()?;

        Ok(value)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let tx = self.db.transaction();
        tx.delete(make_key(key))?;
        tx.commit()?;

        Ok(())
    }

    /// Removes every entry whose key starts with `prefix`, returns the number of removed entries.
    pub fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let tx = self.db.transaction();
        let prefix = make_key(prefix);

        let mut keys = vec![];
        for kv in tx.prefix_iterator(prefix.clone()) {
            let (key, _) = kv?;
            if !key.starts_with(&prefix) {
                break;
            }
            keys.push(key);
        }

        for key in keys.iter() {
            tx.delete(key)?;
        }
        tx.commit()?;
        debug!(removed = keys.len(), "kv prefix deleted");

        Ok(keys.len())
    }

    /// Takes the lock stored under `key` for `ttl`.
    ///
    /// Returns false if the lock is held by someone else and has not expired yet.
    pub fn try_lock(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.try_lock_at(key, ttl, Utc::now())
    }

    pub(crate) fn try_lock_at(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<bool> {
        let tx = self.db.transaction();
        let k = make_key(key);

        let current = match tx.get_for_update(&k, true) {
            Ok(v) => v,
            Err(err) if is_contention(&err) => return Ok(false),
            Err(err) => return Err(MetadataError::RocksDb(err)),
        };

        if let Some(v) = current {
            let entry: Entry = deserialize(&v)?;
            if !entry.is_expired(now) {
                return Ok(false);
            }
        }

        let entry = Entry {
            expires_at: expiration(now, Some(ttl)),
            value: vec![],
        };
        tx.put(&k, serialize(&entry)?)?;
        match tx.commit() {
            Ok(_) => Ok(true),
            Err(err) if is_contention(&err) => Ok(false),
            Err(err) => Err(MetadataError::RocksDb(err)),
        }
    }

    pub fn unlock(&self, key: &str) -> Result<()> {
        self.delete(key)
    }
}
