use std::sync::Arc;

use axum::extract::Extension;
use axum::extract::Path;
use axum::routing;
use axum::Router;
use common::http::Json;

use crate::payments::PaymentEvent;
use crate::revenue::Revenue;
use crate::revenue::RevenueSummary;
use crate::revenue::SyncResponse;
use crate::revenue::WebhookResponse;
use crate::Context;
use crate::Result;

async fn webhook(
    Extension(provider): Extension<Arc<Revenue>>,
    Path(website_id): Path<String>,
    Json(payment): Json<PaymentEvent>,
) -> Result<Json<WebhookResponse>> {
    Ok(Json(provider.webhook(&website_id, payment).await?))
}

async fn summary(
    ctx: Context,
    Extension(provider): Extension<Arc<Revenue>>,
    Path(website_id): Path<String>,
) -> Result<Json<RevenueSummary>> {
    Ok(Json(provider.summary(ctx, &website_id).await?))
}

async fn sync(
    ctx: Context,
    Extension(provider): Extension<Arc<Revenue>>,
    Path(website_id): Path<String>,
) -> Result<Json<SyncResponse>> {
    Ok(Json(provider.sync(ctx, &website_id).await?))
}

pub fn attach_routes(router: Router) -> Router {
    router
        .route(
            "/api/v1/webhooks/payments/:website_id",
            routing::post(webhook),
        )
        .nest(
            "/api/v1/websites/:website_id/revenue",
            Router::new()
                .route("/", routing::get(summary))
                .route("/sync", routing::post(sync)),
        )
}
