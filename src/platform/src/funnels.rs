use std::sync::Arc;

use metadata::funnels::Funnel;
use metadata::funnels::FunnelStep;
use metadata::funnels::Funnels as MDFunnels;
use metadata::funnels::StepKind;
use metadata::ListResponse;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ValidationError;
use crate::Context;
use crate::Result;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunnelRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateStepRequest {
    pub name: String,
    pub kind: StepKind,
    pub descriptor: String,
}

/// Funnel definitions of a website.
pub struct Funnels {
    prov: Arc<MDFunnels>,
}

impl Funnels {
    pub fn new(prov: Arc<MDFunnels>) -> Self {
        Self { prov }
    }

    pub async fn create(
        &self,
        ctx: Context,
        website_id: &str,
        request: CreateFunnelRequest,
    ) -> Result<Funnel> {
        ctx.check_website(website_id)?;
        let mut err = ValidationError::new();
        if request.name.trim().is_empty() {
            err.push("name", "required");
        }
        err.result()?;

        Ok(self
            .prov
            .create(website_id, metadata::funnels::CreateFunnelRequest {
                created_by: None,
                name: request.name,
            })?)
    }

    pub async fn get_by_id(&self, ctx: Context, website_id: &str, id: u64) -> Result<Funnel> {
        ctx.check_website(website_id)?;

        Ok(self.prov.get_by_id(website_id, id)?)
    }

    pub async fn list(&self, ctx: Context, website_id: &str) -> Result<ListResponse<Funnel>> {
        ctx.check_website(website_id)?;

        Ok(self.prov.list(website_id)?)
    }

    pub async fn delete(&self, ctx: Context, website_id: &str, id: u64) -> Result<Funnel> {
        ctx.check_website(website_id)?;

        Ok(self.prov.delete(website_id, id)?)
    }

    /// Adds a step at the end of the funnel. The descriptor must compile.
    pub async fn create_step(
        &self,
        ctx: Context,
        website_id: &str,
        funnel_id: u64,
        request: CreateStepRequest,
    ) -> Result<FunnelStep> {
        ctx.check_website(website_id)?;
        query::funnel::compile(request.kind, &request.descriptor)?;

        Ok(self.prov.create_step(
            website_id,
            funnel_id,
            metadata::funnels::CreateFunnelStepRequest {
                name: request.name,
                kind: request.kind,
                descriptor: request.descriptor,
            },
        )?)
    }

    pub async fn list_steps(
        &self,
        ctx: Context,
        website_id: &str,
        funnel_id: u64,
    ) -> Result<Vec<FunnelStep>> {
        ctx.check_website(website_id)?;

        Ok(self.prov.list_steps(website_id, funnel_id)?)
    }

    pub async fn delete_step(
        &self,
        ctx: Context,
        website_id: &str,
        funnel_id: u64,
        step_id: u64,
    ) -> Result<FunnelStep> {
        ctx.check_website(website_id)?;

        Ok(self.prov.delete_step(website_id, funnel_id, step_id)?)
    }
}
