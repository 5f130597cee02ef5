use std::sync::Arc;

use chrono::Utc;
use rocksdb::TransactionDB;

use crate::website_ns;
use crate::Result;

const SUBSCRIPTIONS_NS: &[u8] = b"subscriptions";
const PAYMENTS_NS: &[u8] = b"payments";

fn make_key(website_id: &str, ns: &[u8], id: &str) -> Vec<u8> {
    [website_ns(website_id, ns).as_slice(), b"/", id.as_bytes()].concat()
}

/// Registry of seen subscriptions and payments.
pub struct Subscriptions {
    db: Arc<TransactionDB>,
}

impl Subscriptions {
    pub fn new(db: Arc<TransactionDB>) -> Self {
        Subscriptions { db }
    }

    // marks `key` as seen, returns true if it was not seen before
    fn mark(&self, key: Vec<u8>) -> Result<bool> {
        let tx = self.db.transaction();
        if tx.get_for_update(&key, true)?.is_some() {
            return Ok(false);
        }

        tx.put(&key, Utc::now().timestamp_millis().to_le_bytes())?;
        tx.commit()?;

        Ok(true)
    }

    fn forget(&self, key: Vec<u8>) -> Result<()> {
        let tx = self.db.transaction();
        tx.delete(&key)?;
        tx.commit()?;

        Ok(())
    }

    /// True exactly once per subscription id: on the first payment of the subscription.
    pub fn is_first_renewal(&self, website_id: &str, subscription_id: &str) -> Result<bool> {
        self.mark(make_key(website_id, SUBSCRIPTIONS_NS, subscription_id))
    }

    /// Records a payment id, returns false for duplicate deliveries.
    pub fn record_payment(&self, website_id: &str, payment_id: &str) -> Result<bool> {
        self.mark(make_key(website_id, PAYMENTS_NS, payment_id))
    }

    /// Undoes [Self::is_first_renewal] so the next call for the subscription returns true again.
    pub fn forget_renewal(&self, website_id: &str, subscription_id: &str) -> Result<()> {
        self.forget(make_key(website_id, SUBSCRIPTIONS_NS, subscription_id))
    }

    pub fn forget_payment(&self, website_id: &str, payment_id: &str) -> Result<()> {
        self.forget(make_key(website_id, PAYMENTS_NS, payment_id))
    }
}
