use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use common::types::cache_generation_key;
use common::types::cache_main_prefix;
use common::types::lock_key;
use common::types::LOCK_FEATURE_REVENUE_SYNC;
use common::types::METRIC_REVENUE_WEBHOOKS_TOTAL;
use metadata::MetadataProvider;
use metrics::counter;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use storage::record::Revenue as RevenueRecord;
use storage::record::RevenueKind;
use storage::Collection;
use storage::Condition;
use storage::Field;
use storage::Filter;
use storage::Record;
use storage::Store;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::anchor::resolve_anchor;
use crate::payments::PaymentEvent;
use crate::payments::PaymentsSource;
use crate::Context;
use crate::PlatformError;
use crate::Result;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WebhookResponse {
    pub ok: bool,
    pub recorded: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SyncResponse {
    pub ok: bool,
    pub fetched: bool,
    pub recorded: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrencySummary {
    pub total: Decimal,
    pub new: Decimal,
    pub recurring: Decimal,
    pub payments: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub ok: bool,
    pub since: DateTime<Utc>,
    pub currencies: BTreeMap<String, CurrencySummary>,
}

pub fn summary_cache_key(website_id: &str, generation: u64, anchor_ts: i64) -> String {
    format!(
        "{}revenue:{generation}:{anchor_ts}",
        cache_main_prefix(website_id)
    )
}

/// Revenue attribution: payment ingestion and the per-website summary.
pub struct Revenue {
    store: Arc<dyn Store>,
    md: Arc<MetadataProvider>,
    payments: Option<Arc<dyn PaymentsSource>>,
    cache_ttl: Duration,
    lock_ttl: Duration,
}

impl Revenue {
    pub fn new(
        store: Arc<dyn Store>,
        md: Arc<MetadataProvider>,
        payments: Option<Arc<dyn PaymentsSource>>,
        cache_ttl: Duration,
        lock_ttl: Duration,
    ) -> Self {
        Self {
            store,
            md,
            payments,
            cache_ttl,
            lock_ttl,
        }
    }

    // returns true if the payment was appended to the log
    async fn ingest(&self, website_id: &str, payment: PaymentEvent) -> Result<bool> {
        if !payment.is_qualifying() {
            debug!(payment_id = %payment.id, typ = %payment.typ, "payment skipped");
            return Ok(false);
        }
        let (Some(visitor_id), Some(session_id)) =
            (payment.visitor_id.clone(), payment.session_id.clone())
        else {
            return Ok(false);
        };

        let subs = &self.md.subscriptions;
        if !subs.record_payment(website_id, &payment.id)? {
            debug!(payment_id = %payment.id, "duplicate payment delivery");
            return Ok(false);
        }

        let first_renewal = match &payment.subscription_id {
            None => false,
            Some(sub) => match subs.is_first_renewal(website_id, sub) {
                Ok(first) => first,
                Err(err) => {
                    subs.forget_payment(website_id, &payment.id)?;
                    return Err(err.into());
                }
            },
        };
        let kind = match &payment.subscription_id {
            Some(_) if !first_renewal => RevenueKind::Recurring,
            _ => RevenueKind::New,
        };

        let payment_id = payment.id.clone();
        let subscription_id = payment.subscription_id.clone();
        let record = Record::Revenue(RevenueRecord {
            id: payment.id,
            website: website_id.to_string(),
            visitor_id,
            session_id,
            subscription_id: payment.subscription_id,
            amount: payment.amount,
            currency: payment.currency,
            kind,
            created_at: payment.created_at.unwrap_or_else(Utc::now),
        });

        // a redelivery of a payment that failed to append must be processed as the first one
        if let Err(err) = self.store.insert(record).await {
            warn!(payment_id = %payment_id, "revenue append failed, payment marks reverted");
            if first_renewal {
                if let Some(sub) = &subscription_id {
                    subs.forget_renewal(website_id, sub)?;
                }
            }
            subs.forget_payment(website_id, &payment_id)?;
            return Err(err.into());
        }

        self.invalidate_cache(website_id)?;

        Ok(true)
    }

    fn invalidate_cache(&self, website_id: &str) -> Result<()> {
        // summaries computed before the bump are written under the stale generation
        let generation = self.md.kv.incr(&cache_generation_key(website_id))?;
        let removed = self.md.kv.delete_prefix(&cache_main_prefix(website_id))?;
        debug!(website_id, generation, removed, "website cache invalidated");

        Ok(())
    }

    /// Handles a payment notification pushed by the payment provider.
    pub async fn webhook(&self, website_id: &str, payment: PaymentEvent) -> Result<WebhookResponse> {
        counter!(METRIC_REVENUE_WEBHOOKS_TOTAL, "type" => payment.typ.clone()).increment(1);
        let recorded = self.ingest(website_id, payment).await?;

        Ok(WebhookResponse { ok: true, recorded })
    }

    /// Revenue recorded after the anchor of the request, cached for the configured ttl.
    pub async fn summary(&self, ctx: Context, website_id: &str) -> Result<RevenueSummary> {
        ctx.check_website(website_id)?;
        let anchor = resolve_anchor(&ctx.request)?;

        let generation = self.md.kv.counter(&cache_generation_key(website_id))?;
        let key = summary_cache_key(website_id, generation, anchor.timestamp());
        if let Some(cached) = self.md.kv.get(&key)? {
            debug!(key = %key, "revenue summary served from cache");
            return Ok(serde_json::from_slice(&cached)?);
        }

        let filter = Filter::new()
            .and(Condition::Equal(Field::Website, website_id.to_string()))
            .and(Condition::GreaterThan(Field::CreatedAt, anchor));
        let rows = self
            .store
            .query(Collection::Revenue, &filter, &[
                Field::Amount,
                Field::Currency,
                Field::RevenueKind,
            ])
            .await?;

        let mut currencies: BTreeMap<String, CurrencySummary> = BTreeMap::new();
        for row in rows.iter() {
            let (Some(currency), Some(amount)) = (
                row.get_str(Field::Currency),
                row.get(Field::Amount).and_then(|v| v.as_decimal()),
            ) else {
                return Err(PlatformError::Internal(
                    "revenue record without amount or currency".to_string(),
                ));
            };

            let summary = currencies.entry(currency.to_string()).or_default();
            summary.total += amount;
            summary.payments += 1;
            if row.get_str(Field::RevenueKind) == Some(RevenueKind::Recurring.as_str()) {
                summary.recurring += amount;
            } else {
                summary.new += amount;
            }
        }

        let summary = RevenueSummary {
            ok: true,
            since: anchor,
            currencies,
        };
        self.md
            .kv
            .set(&key, &serde_json::to_vec(&summary)?, Some(self.cache_ttl))?;

        Ok(summary)
    }

    /// Pulls payments from the configured source, at most once per lock ttl and website.
    pub async fn sync(&self, ctx: Context, website_id: &str) -> Result<SyncResponse> {
        ctx.check_website(website_id)?;
        let source = self.payments.as_ref().ok_or_else(|| {
            PlatformError::BadRequest("payments source is not configured".to_string())
        })?;

        let lock = lock_key(LOCK_FEATURE_REVENUE_SYNC, website_id);
        if !self.md.kv.try_lock(&lock, self.lock_ttl)? {
            debug!(website_id, "revenue sync throttled");
            return Ok(SyncResponse {
                ok: true,
                fetched: false,
                recorded: 0,
            });
        }

        let payments = source.fetch(website_id).await?;
        let fetched = payments.len();
        let mut recorded = 0;
        for payment in payments {
            if self.ingest(website_id, payment).await? {
                recorded += 1;
            }
        }
        info!(website_id, fetched, recorded, "revenue synced");

        Ok(SyncResponse {
            ok: true,
            fetched: true,
            recorded,
        })
    }
}
