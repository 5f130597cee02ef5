use std::collections::HashSet;

use metrics::counter;
use storage::Condition;
use storage::Field;
use storage::Filter;
use storage::Store;
use tracing::trace;

use crate::funnel::predicate::Predicate;
use crate::Context;
use crate::Result;

pub const METRIC_STEP_QUERIES_TOTAL: &str = common::types::METRIC_FUNNEL_STEP_QUERIES_TOTAL;

fn base_filter(ctx: &Context, predicate: &Predicate) -> Filter {
    Filter::new()
        .and(Condition::Equal(Field::Website, ctx.website_id.clone()))
        .and(Condition::GreaterThan(Field::CreatedAt, ctx.anchor))
        .and(predicate.condition())
}

/// Splits `set` into groups of at most `size` identifiers. An empty set yields a single
/// empty group so the membership query is still issued.
fn chunks(set: &HashSet<String>, size: usize) -> Vec<HashSet<String>> {
    if set.is_empty() {
        return vec![HashSet::new()];
    }

    let ids: Vec<&String> = set.iter().collect();
    ids.chunks(size.max(1))
        .map(|chunk| chunk.iter().map(|id| (*id).clone()).collect())
        .collect()
}

async fn distinct_visitors(
    store: &dyn Store,
    predicate: &Predicate,
    filter: &Filter,
) -> Result<HashSet<String>> {
    counter!(METRIC_STEP_QUERIES_TOTAL, "collection" => predicate.collection().as_str())
        .increment(1);

    let rows = store
        .query(predicate.collection(), filter, &[Field::Id, Field::VisitorId])
        .await?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get_str(Field::VisitorId))
        .map(|v| v.to_string())
        .collect())
}

/// Distinct visitors of `ctx.website_id` matching `predicate` after the anchor.
///
/// `surviving` restricts the match to visitors that reached the previous step, `None` means
/// no restriction. Store errors are returned as is, they never turn into an empty result.
pub async fn evaluate(
    store: &dyn Store,
    ctx: &Context,
    predicate: &Predicate,
    surviving: Option<&HashSet<String>>,
) -> Result<HashSet<String>> {
    let filter = base_filter(ctx, predicate);

    let surviving = match surviving {
        None => return distinct_visitors(store, predicate, &filter).await,
        Some(s) => s,
    };

    let mut visitors = HashSet::new();
    for chunk in chunks(surviving, ctx.in_chunk_size) {
        trace!(chunk_size = chunk.len(), "querying surviving chunk");
        let filter = filter.clone().and(Condition::In(Field::VisitorId, chunk));
        visitors.extend(distinct_visitors(store, predicate, &filter).await?);
    }

    Ok(visitors)
}
