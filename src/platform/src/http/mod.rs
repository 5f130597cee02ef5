pub mod funnel;
pub mod funnels;
pub mod revenue;

use std::sync::Arc;

use axum::middleware;
use axum::Extension;
use axum::Router;
use common::http::measure_request_response;
use tower::ServiceBuilder;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::PlatformProvider;

pub fn attach_routes(mut router: Router, platform: &Arc<PlatformProvider>) -> Router {
    router = funnel::attach_routes(router);
    router = funnels::attach_routes(router);
    router = revenue::attach_routes(router);

    router = router
        .layer(Extension(platform.funnel.clone()))
        .layer(Extension(platform.funnels.clone()))
        .layer(Extension(platform.revenue.clone()))
        .layer(Extension(platform.verifier.clone()));

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(middleware::from_fn(measure_request_response)),
    )
}
