use std::sync::Arc;

use metadata::MetadataProvider;
use query::funnel::Step;
use query::funnel::StepResult;
use query::FunnelProvider;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::anchor::resolve_anchor;
use crate::error::ValidationError;
use crate::Context;
use crate::PlatformError;
use crate::Result;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    pub website_id: Option<String>,
    // kept as a string so a malformed id is reported like a missing one
    pub funnel_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FunnelResponse {
    pub ok: bool,
    pub dataset: Vec<StepResult>,
}

pub struct Funnel {
    md: Arc<MetadataProvider>,
    prov: Arc<FunnelProvider>,
    timeout: std::time::Duration,
    in_chunk_size: usize,
}

impl Funnel {
    pub fn new(
        md: Arc<MetadataProvider>,
        prov: Arc<FunnelProvider>,
        timeout: std::time::Duration,
        in_chunk_size: usize,
    ) -> Self {
        Self {
            md,
            prov,
            timeout,
            in_chunk_size,
        }
    }

    pub async fn evaluate(&self, ctx: Context, params: EvaluateParams) -> Result<FunnelResponse> {
        let (website_id, funnel_id) = validate_params(params)?;
        ctx.check_website(&website_id)?;

        let anchor = resolve_anchor(&ctx.request)?;
        let steps: Vec<Step> = self
            .md
            .funnels
            .list_steps(&website_id, funnel_id)?
            .into_iter()
            .map(Step::from)
            .collect();
        debug!(
            website_id = %website_id,
            funnel_id,
            steps = steps.len(),
            %anchor,
            "evaluating funnel"
        );

        let qctx = query::Context::new(website_id, anchor).with_in_chunk_size(self.in_chunk_size);
        let dataset = match tokio::time::timeout(self.timeout, self.prov.funnel(&qctx, steps)).await
        {
            Ok(res) => res?,
            Err(_) => {
                warn!(funnel_id, "funnel evaluation timed out");
                return Err(PlatformError::Unavailable(format!(
                    "funnel {funnel_id} evaluation timed out"
                )));
            }
        };

        Ok(FunnelResponse { ok: true, dataset })
    }
}

fn validate_params(params: EvaluateParams) -> Result<(String, u64)> {
    let mut err = ValidationError::new();

    let website_id = match params.website_id {
        Some(id) if !id.is_empty() => Some(id),
        _ => {
            err.push("websiteId", "required");
            None
        }
    };
    let funnel_id = match params.funnel_id {
        None => {
            err.push("funnelId", "required");
            None
        }
        Some(id) => match id.parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => {
                err.push_invalid("funnelId");
                None
            }
        },
    };
    err.result()?;

    match (website_id, funnel_id) {
        (Some(w), Some(f)) => Ok((w, f)),
        _ => Err(PlatformError::BadRequest(
            "websiteId and funnelId are required".to_string(),
        )),
    }
}
