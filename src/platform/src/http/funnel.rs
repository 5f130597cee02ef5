use std::sync::Arc;

use axum::extract::Extension;
use axum::extract::Query;
use axum::routing;
use axum::Router;
use common::http::Json;

use crate::funnel::EvaluateParams;
use crate::funnel::Funnel;
use crate::funnel::FunnelResponse;
use crate::Context;
use crate::Result;

async fn evaluate(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnel>>,
    Query(params): Query<EvaluateParams>,
) -> Result<Json<FunnelResponse>> {
    Ok(Json(provider.evaluate(ctx, params).await?))
}

pub fn attach_routes(router: Router) -> Router {
    router.route("/api/v1/funnels/evaluate", routing::get(evaluate))
}
