use rocksdb::Transaction;
use rocksdb::TransactionDB;

use crate::error::MetadataError;
use crate::Result;

fn decode_seq(v: Vec<u8>) -> Result<u64> {
    let bytes: [u8; 8] = v
        .try_into()
        .map_err(|_| MetadataError::Internal("corrupted sequence value".to_string()))?;
    Ok(u64::from_le_bytes(bytes))
}

/// Increments and returns the sequence stored at `key`; the first value is 1.
/// The read is done for update so concurrent transactions can't hand out the same id.
pub fn next_seq<K: AsRef<[u8]>>(tx: &Transaction<TransactionDB>, key: K) -> Result<u64> {
    let id = tx.get_for_update(key.as_ref(), true)?;
    let result: u64 = match id {
        Some(v) => decode_seq(v)? + 1,
        None => 1,
    };
    tx.put(key, result.to_le_bytes())?;

    Ok(result)
}
