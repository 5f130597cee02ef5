use std::fs;
use std::sync::Arc;

use axum::Router;
use common::config::Config;
use common::types::DATA_PATH_METADATA;
use common::types::DATA_PATH_STORAGE;
use common::types::METRIC_FUNNEL_EVALUATIONS_TOTAL;
use common::types::METRIC_FUNNEL_EVALUATION_TIME_SECONDS;
use common::types::METRIC_FUNNEL_STEP_QUERIES_TOTAL;
use common::types::METRIC_HTTP_REQUESTS_TOTAL;
use common::types::METRIC_HTTP_REQUEST_TIME_SECONDS;
use common::types::METRIC_REVENUE_WEBHOOKS_TOTAL;
use metadata::MetadataProvider;
use metrics::describe_counter;
use metrics::describe_histogram;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusBuilder;
use platform::payments::HttpPaymentsSource;
use platform::payments::PaymentsSource;
use platform::PlatformProvider;
use storage::RocksStore;
use storage::Store;
use storage::METRIC_STORE_INSERTS_TOTAL;
use storage::METRIC_STORE_QUERIES_TOTAL;
use tracing::debug;
use tracing::info;

pub mod command;
pub mod config;
pub mod error;

pub fn init_metrics() -> error::Result<()> {
    let builder = PrometheusBuilder::new();
    builder.install()?;

    describe_counter!(METRIC_HTTP_REQUESTS_TOTAL, "number of http requests");
    describe_histogram!(
        METRIC_HTTP_REQUEST_TIME_SECONDS,
        Unit::Seconds,
        "http request time"
    );
    describe_counter!(
        METRIC_FUNNEL_EVALUATIONS_TOTAL,
        "number of funnel evaluations"
    );
    describe_histogram!(
        METRIC_FUNNEL_EVALUATION_TIME_SECONDS,
        Unit::Seconds,
        "funnel evaluation time"
    );
    describe_counter!(
        METRIC_FUNNEL_STEP_QUERIES_TOTAL,
        "number of store queries issued by funnel steps"
    );
    describe_counter!(
        METRIC_REVENUE_WEBHOOKS_TOTAL,
        "number of payment webhooks received"
    );
    describe_counter!(METRIC_STORE_INSERTS_TOTAL, "number of inserts processed");
    describe_counter!(METRIC_STORE_QUERIES_TOTAL, "number of queries processed");

    Ok(())
}

pub fn init_fs(cfg: &Config) -> error::Result<()> {
    debug!("data path: {:?}", cfg.data.path);
    fs::create_dir_all(cfg.data.path.join(DATA_PATH_METADATA))?;
    fs::create_dir_all(cfg.data.path.join(DATA_PATH_STORAGE))?;

    Ok(())
}

pub fn init_metadata(cfg: &Config) -> error::Result<Arc<MetadataProvider>> {
    let rocks = Arc::new(metadata::rocksdb::new(
        cfg.data.path.join(DATA_PATH_METADATA),
    )?);

    Ok(Arc::new(MetadataProvider::new(rocks)))
}

pub fn init_store(cfg: &Config) -> error::Result<Arc<dyn Store>> {
    let store = RocksStore::open(cfg.data.path.join(DATA_PATH_STORAGE))?;

    Ok(Arc::new(store))
}

pub fn init_platform(
    md: Arc<MetadataProvider>,
    store: Arc<dyn Store>,
    router: Router,
    cfg: &Config,
) -> error::Result<Router> {
    let payments = match &cfg.payments.source_url {
        Some(url) => {
            info!("payments source: {url}");
            Some(Arc::new(HttpPaymentsSource::try_new(url)?) as Arc<dyn PaymentsSource>)
        }
        None => {
            info!("payments source is not configured, revenue sync is disabled");
            None
        }
    };

    let platform_provider = Arc::new(PlatformProvider::new(md, store, payments, cfg)?);

    info!("attaching platform routes...");
    Ok(platform::http::attach_routes(router, &platform_provider))
}
