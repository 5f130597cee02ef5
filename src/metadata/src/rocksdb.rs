use std::fs;
use std::path::Path;

use rocksdb::Options;
use rocksdb::TransactionDB;
use rocksdb::TransactionDBOptions;
use tracing::debug;

use crate::Result;

/// Opens (creating if needed) the metadata database at `path`.
pub fn new<P: AsRef<Path>>(path: P) -> Result<TransactionDB> {
    fs::create_dir_all(path.as_ref())?;
    debug!("opening metadata db at {:?}", path.as_ref());

    let mut opts = Options::default();
    opts.create_if_missing(true);

    let txopts = TransactionDBOptions::default();

    Ok(TransactionDB::open(&opts, &txopts, path)?)
}
