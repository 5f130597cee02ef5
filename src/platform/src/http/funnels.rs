use std::sync::Arc;

use axum::extract::Extension;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing;
use axum::Router;
use common::http::Json;
use metadata::funnels::Funnel;
use metadata::funnels::FunnelStep;

use crate::funnels::CreateFunnelRequest;
use crate::funnels::CreateStepRequest;
use crate::funnels::Funnels;
use crate::Context;
use crate::ListResponse;
use crate::Result;

async fn create(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnels>>,
    Path(website_id): Path<String>,
    Json(request): Json<CreateFunnelRequest>,
) -> Result<(StatusCode, Json<Funnel>)> {
    Ok((
        StatusCode::CREATED,
        Json(provider.create(ctx, &website_id, request).await?),
    ))
}

async fn get_by_id(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnels>>,
    Path((website_id, funnel_id)): Path<(String, u64)>,
) -> Result<Json<Funnel>> {
    Ok(Json(provider.get_by_id(ctx, &website_id, funnel_id).await?))
}

async fn list(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnels>>,
    Path(website_id): Path<String>,
) -> Result<Json<ListResponse<Funnel>>> {
    Ok(Json(provider.list(ctx, &website_id).await?))
}

async fn delete(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnels>>,
    Path((website_id, funnel_id)): Path<(String, u64)>,
) -> Result<Json<Funnel>> {
    Ok(Json(provider.delete(ctx, &website_id, funnel_id).await?))
}

async fn create_step(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnels>>,
    Path((website_id, funnel_id)): Path<(String, u64)>,
    Json(request): Json<CreateStepRequest>,
) -> Result<(StatusCode, Json<FunnelStep>)> {
    Ok((
        StatusCode::CREATED,
        Json(
            provider
                .create_step(ctx, &website_id, funnel_id, request)
                .await?,
        ),
    ))
}

async fn list_steps(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnels>>,
    Path((website_id, funnel_id)): Path<(String, u64)>,
) -> Result<Json<Vec<FunnelStep>>> {
    Ok(Json(
        provider.list_steps(ctx, &website_id, funnel_id).await?,
    ))
}

async fn delete_step(
    ctx: Context,
    Extension(provider): Extension<Arc<Funnels>>,
    Path((website_id, funnel_id, step_id)): Path<(String, u64, u64)>,
) -> Result<Json<FunnelStep>> {
    Ok(Json(
        provider
            .delete_step(ctx, &website_id, funnel_id, step_id)
            .await?,
    ))
}

pub fn attach_routes(router: Router) -> Router {
    router.nest(
        "/api/v1/websites/:website_id/funnels",
        Router::new()
            .route("/", routing::post(create).get(list))
            .route("/:funnel_id", routing::get(get_by_id).delete(delete))
            .route(
                "/:funnel_id/steps",
                routing::post(create_step).get(list_steps),
            )
            .route("/:funnel_id/steps/:step_id", routing::delete(delete_step)),
    )
}
