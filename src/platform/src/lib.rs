pub mod anchor;
pub mod context;
pub mod error;
pub mod funnel;
pub mod funnels;
pub mod http;
pub mod payments;
pub mod revenue;

use std::sync::Arc;

use common::config::Config;
pub use context::Context;
pub use error::PlatformError;
pub use error::Result;
use metadata::MetadataProvider;
pub use metadata::ListResponse;
use query::FunnelProvider;
use storage::Store;

use crate::anchor::RequestVerifier;
use crate::anchor::TokenVerifier;
use crate::payments::PaymentsSource;

pub struct PlatformProvider {
    pub funnel: Arc<funnel::Funnel>,
    pub funnels: Arc<funnels::Funnels>,
    pub revenue: Arc<revenue::Revenue>,
    pub verifier: Arc<dyn RequestVerifier>,
}

impl PlatformProvider {
    pub fn new(
        md: Arc<MetadataProvider>,
        store: Arc<dyn Store>,
        payments: Option<Arc<dyn PaymentsSource>>,
        cfg: &Config,
    ) -> Result<Self> {
        let timeout = cfg
            .query
            .timeout
            .to_std()
            .map_err(|err| PlatformError::BadRequest(format!("invalid query timeout: {err}")))?;

        Ok(Self {
            funnel: Arc::new(funnel::Funnel::new(
                md.clone(),
                Arc::new(FunnelProvider::new(store.clone())),
                timeout,
                cfg.query.in_chunk_size,
            )),
            funnels: Arc::new(funnels::Funnels::new(md.funnels.clone())),
            revenue: Arc::new(revenue::Revenue::new(
                store,
                md,
                payments,
                cfg.cache.ttl,
                cfg.throttle.lock_ttl,
            )),
            verifier: Arc::new(TokenVerifier::new(cfg.auth.token_key.clone())),
        })
    }
}
