use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::Result;

pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";
pub const SUBSCRIPTION_RENEWED: &str = "subscription.renewed";

/// Payment notification as delivered by the payment provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub subscription_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub visitor_id: Option<String>,
    pub session_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentEvent {
    /// Only successful payments that can be attributed to a visit are recorded.
    pub fn is_qualifying(&self) -> bool {
        (self.typ == PAYMENT_SUCCEEDED || self.typ == SUBSCRIPTION_RENEWED)
            && self.visitor_id.is_some()
            && self.session_id.is_some()
    }
}

#[async_trait]
pub trait PaymentsSource: Send + Sync {
    /// Payments of the website known to the provider.
    async fn fetch(&self, website_id: &str) -> Result<Vec<PaymentEvent>>;
}

/// Reads payments from `GET <source_url>?websiteId=<id>` returning a JSON array.
pub struct HttpPaymentsSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpPaymentsSource {
    pub fn try_new(source_url: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(source_url)?,
        })
    }
}

#[async_trait]
impl PaymentsSource for HttpPaymentsSource {
    async fn fetch(&self, website_id: &str) -> Result<Vec<PaymentEvent>> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("websiteId", website_id);
        debug!("fetching payments from {url}");

        let payments = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<PaymentEvent>>()
            .await?;

        Ok(payments)
    }
}
