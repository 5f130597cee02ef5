mod funnel;
mod funnels;
mod revenue;

#[cfg(test)]
mod tests {
    use std::env::temp_dir;
    use std::net::SocketAddr;
    use std::sync::atomic::AtomicU16;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::Router;
    use chrono::Duration;
    use chrono::Utc;
    use common::config::Config;
    use lazy_static::lazy_static;
    use metadata::MetadataProvider;
    use platform::anchor::make_token;
    use platform::http::attach_routes;
    use platform::payments::PaymentEvent;
    use platform::payments::PaymentsSource;
    use reqwest::header::HeaderMap;
    use reqwest::header::HeaderValue;
    use reqwest::header::AUTHORIZATION;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;
    use storage::MemoryStore;
    use tokio::time::sleep;
    use uuid::Uuid;

    pub const TOKEN_KEY: &str = "test-key";

    lazy_static! {
        pub static ref EMPTY_LIST: serde_json::Value = json!({"data":[],"meta":{"next":null}});
        pub static ref TEST_CFG: Config = {
            let mut cfg = Config::default();
            cfg.auth.token_key = TOKEN_KEY.to_string();
            cfg.query.in_chunk_size = 2;
            cfg
        };
    }
    static HTTP_PORT: AtomicU16 = AtomicU16::new(18080);

    /// Serves a fixed list of payments and counts the fetches.
    pub struct StaticPayments {
        pub payments: Vec<PaymentEvent>,
        pub fetches: AtomicUsize,
    }

    #[async_trait]
    impl PaymentsSource for StaticPayments {
        async fn fetch(&self, _website_id: &str) -> platform::Result<Vec<PaymentEvent>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.payments.clone())
        }
    }

    pub struct TestService {
        pub base_url: String,
        pub md: Arc<MetadataProvider>,
        pub store: Arc<MemoryStore>,
        pub payments: Arc<StaticPayments>,
    }

    /// Headers of a request signed for `website_id` with the anchor one day ago.
    pub fn auth_headers(website_id: &str) -> anyhow::Result<HeaderMap> {
        auth_headers_at(website_id, (Utc::now() - Duration::days(1)).timestamp())
    }

    pub fn auth_headers_at(website_id: &str, timestamp: i64) -> anyhow::Result<HeaderMap> {
        let token = make_token(website_id, timestamp, Duration::hours(1), TOKEN_KEY)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str("application/json")?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(format!("Bearer {token}").as_str())?,
        );

        Ok(headers)
    }

    pub async fn run_http_service(payments: Vec<PaymentEvent>) -> anyhow::Result<TestService> {
        let mut path = temp_dir();
        path.push(format!("{}", Uuid::new_v4()));
        let rocks = Arc::new(metadata::rocksdb::new(path.join("md"))?);
        let md = Arc::new(MetadataProvider::new(rocks));
        let store = Arc::new(MemoryStore::new());
        let payments = Arc::new(StaticPayments {
            payments,
            fetches: AtomicUsize::new(0),
        });

        let platform_provider = Arc::new(platform::PlatformProvider::new(
            md.clone(),
            store.clone(),
            Some(payments.clone() as Arc<dyn PaymentsSource>),
            &TEST_CFG,
        )?);

        let addr = SocketAddr::from(([127, 0, 0, 1], HTTP_PORT.fetch_add(1, Ordering::SeqCst)));
        let router = attach_routes(Router::new(), &platform_provider);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(TestService {
            base_url: format!("http://{}:{}/api/v1", addr.ip(), addr.port()),
            md,
            store,
            payments,
        })
    }

    #[macro_export]
    macro_rules! assert_response_status_eq {
        ($resp:expr,$status:expr) => {{
            assert_eq!(
                $resp.status(),
                $status,
                "{}",
                $resp.text().await.unwrap().as_str()
            )
        }};
    }

    #[macro_export]
    macro_rules! assert_response_json_eq {
        ($resp:expr, $body:expr) => {{ assert_eq!($resp.text().await.unwrap(), $body.to_string()) }};
    }
}
