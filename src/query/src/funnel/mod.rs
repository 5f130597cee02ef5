pub mod predicate;
pub mod step;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::DateTime;
use chrono::Utc;
use common::types::METRIC_FUNNEL_EVALUATIONS_TOTAL;
use common::types::METRIC_FUNNEL_EVALUATION_TIME_SECONDS;
use metadata::funnels::FunnelStep;
pub use metadata::funnels::StepKind;
use metrics::counter;
use metrics::histogram;
pub use predicate::compile;
pub use predicate::Operator;
pub use predicate::Predicate;
use serde::Deserialize;
use serde::Serialize;
use storage::Store;
use tracing::debug;

use crate::funnel::step::evaluate;
use crate::Context;
use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub id: u64,
    pub name: String,
    pub kind: StepKind,
    pub descriptor: String,
    pub created_at: DateTime<Utc>,
}

impl From<FunnelStep> for Step {
    fn from(s: FunnelStep) -> Self {
        Step {
            id: s.id,
            name: s.name,
            kind: s.kind,
            descriptor: s.descriptor,
            created_at: s.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StepResult {
    #[serde(rename = "$id")]
    pub step_id: u64,
    pub visitors: u64,
    pub name: String,
    pub dropoff: u64,
    pub descriptor: String,
    pub kind: StepKind,
}

/// Evaluates funnels against the event log.
pub struct FunnelProvider {
    store: Arc<dyn Store>,
}

impl FunnelProvider {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Counts the visitors reaching each step of the funnel.
    ///
    /// Steps are evaluated in `(created_at, id)` order, each one restricted to the visitors
    /// that matched the step before it. The first failing step aborts the evaluation.
    pub async fn funnel(&self, ctx: &Context, mut steps: Vec<Step>) -> Result<Vec<StepResult>> {
        let start = Instant::now();
        steps.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        let mut surviving: Option<HashSet<String>> = None;
        let mut prev_count: Option<u64> = None;
        let mut results = Vec::with_capacity(steps.len());

        for step in steps {
            let predicate = compile(step.kind, &step.descriptor)?;
            let visitors =
                evaluate(self.store.as_ref(), ctx, &predicate, surviving.as_ref()).await?;

            let count = visitors.len() as u64;
            let dropoff = prev_count.map(|prev| prev.saturating_sub(count)).unwrap_or(0);
            debug!(
                step_id = step.id,
                operator = %predicate.operator,
                visitors = count,
                dropoff,
                "funnel step evaluated"
            );

            results.push(StepResult {
                step_id: step.id,
                visitors: count,
                name: step.name,
                dropoff,
                descriptor: step.descriptor,
                kind: step.kind,
            });
            prev_count = Some(count);
            surviving = Some(visitors);
        }

        counter!(METRIC_FUNNEL_EVALUATIONS_TOTAL).increment(1);
        histogram!(METRIC_FUNNEL_EVALUATION_TIME_SECONDS).record(start.elapsed());

        Ok(results)
    }
}
