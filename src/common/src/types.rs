pub const METRIC_HTTP_REQUESTS_TOTAL: &str = "http.requests_total";
pub const METRIC_HTTP_REQUEST_TIME_SECONDS: &str = "http.request_time_seconds";
pub const METRIC_FUNNEL_EVALUATIONS_TOTAL: &str = "funnel.evaluations_total";
pub const METRIC_FUNNEL_EVALUATION_TIME_SECONDS: &str = "funnel.evaluation_time_seconds";
pub const METRIC_FUNNEL_STEP_QUERIES_TOTAL: &str = "funnel.step_queries_total";
pub const METRIC_REVENUE_WEBHOOKS_TOTAL: &str = "revenue.webhooks_total";

// largest visitor set passed to the store in a single membership condition
pub const DEFAULT_IN_CHUNK_SIZE: usize = 1000;

// cache segment holding the website's dashboard aggregates
pub const CACHE_SEGMENT_MAIN: &str = "main";

pub const LOCK_FEATURE_REVENUE_SYNC: &str = "revenue-sync";

pub const DATA_PATH_METADATA: &str = "md";
pub const DATA_PATH_STORAGE: &str = "storage";

pub fn cache_main_prefix(website_id: &str) -> String {
    format!("{website_id}:{CACHE_SEGMENT_MAIN}:")
}

// bumped on every invalidation of the main segment, kept outside of it
pub fn cache_generation_key(website_id: &str) -> String {
    format!("cache-generation:{website_id}")
}

pub fn lock_key(feature: &str, website_id: &str) -> String {
    format!("{feature}:{website_id}")
}
