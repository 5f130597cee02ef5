use std::sync::Arc;

use bincode::deserialize;
use bincode::serialize;
use chrono::DateTime;
use chrono::Utc;
use rocksdb::Transaction;
use rocksdb::TransactionDB;
use serde::Deserialize;
use serde::Serialize;

use crate::error::MetadataError;
use crate::index::next_seq;
use crate::list_data;
use crate::make_data_key;
use crate::make_data_value_key;
use crate::make_id_seq_key;
use crate::metadata::ListResponse;
use crate::metadata::ResponseMetadata;
use crate::website_ns;
use crate::Result;

const NAMESPACE: &[u8] = b"funnels";

fn steps_ns(website_id: &str, funnel_id: u64) -> Vec<u8> {
    website_ns(
        website_id,
        format!("funnel_steps/{funnel_id}").as_bytes(),
    )
}

/// Funnel and funnel step definitions.
///
/// Steps have no explicit position, a funnel's steps are always returned in creation order.
pub struct Funnels {
    db: Arc<TransactionDB>,
}

impl Funnels {
    pub fn new(db: Arc<TransactionDB>) -> Self {
        Funnels { db }
    }

    fn get_by_id_(
        &self,
        tx: &Transaction<TransactionDB>,
        website_id: &str,
        id: u64,
    ) -> Result<Funnel> {
        let key = make_data_value_key(website_ns(website_id, NAMESPACE).as_slice(), id);

        match tx.get(key)? {
            None => Err(MetadataError::NotFound(format!("funnel {id} not found"))),
            Some(value) => Ok(deserialize(&value)?),
        }
    }

    fn get_step_(
        &self,
        tx: &Transaction<TransactionDB>,
        website_id: &str,
        funnel_id: u64,
        id: u64,
    ) -> Result<FunnelStep> {
        let key = make_data_value_key(steps_ns(website_id, funnel_id).as_slice(), id);

        match tx.get(key)? {
            None => Err(MetadataError::NotFound(format!(
                "funnel step {id} not found"
            ))),
            Some(value) => Ok(deserialize(&value)?),
        }
    }

    pub fn create(&self, website_id: &str, req: CreateFunnelRequest) -> Result<Funnel> {
        let tx = self.db.transaction();

        let ns = website_ns(website_id, NAMESPACE);
        let id = next_seq(&tx, make_id_seq_key(ns.as_slice()))?;
        let funnel = Funnel {
            id,
            created_at: Utc::now(),
            created_by: req.created_by,
            website_id: website_id.to_string(),
            name: req.name,
        };
        tx.put(
            make_data_value_key(ns.as_slice(), funnel.id),
            serialize(&funnel)?,
        )?;
        tx.commit()?;

        Ok(funnel)
    }

    pub fn get_by_id(&self, website_id: &str, id: u64) -> Result<Funnel> {
        let tx = self.db.transaction();

        self.get_by_id_(&tx, website_id, id)
    }

    pub fn list(&self, website_id: &str) -> Result<ListResponse<Funnel>> {
        let tx = self.db.transaction();
        let mut data: Vec<Funnel> = list_data(&tx, website_ns(website_id, NAMESPACE).as_slice())?;
        data.sort_by_key(|f| f.id);

        Ok(ListResponse {
            data,
            meta: ResponseMetadata { next: None },
        })
    }

    /// Deletes the funnel together with its steps.
    pub fn delete(&self, website_id: &str, id: u64) -> Result<Funnel> {
        let tx = self.db.transaction();
        let funnel = self.get_by_id_(&tx, website_id, id)?;

        let steps: Vec<FunnelStep> = list_data(&tx, steps_ns(website_id, id).as_slice())?;
        for step in steps {
            tx.delete(make_data_value_key(
                steps_ns(website_id, id).as_slice(),
                step.id,
            ))?;
        }
        tx.delete(make_id_seq_key(steps_ns(website_id, id).as_slice()))?;
        tx.delete(make_data_value_key(
            website_ns(website_id, NAMESPACE).as_slice(),
            id,
        ))?;
        tx.commit()?;

        Ok(funnel)
    }

    pub fn create_step(
        &self,
        website_id: &str,
        funnel_id: u64,
        req: CreateFunnelStepRequest,
    ) -> Result<FunnelStep> {
        let tx = self.db.transaction();
        // the funnel must exist
        self.get_by_id_(&tx, website_id, funnel_id)?;

        let ns = steps_ns(website_id, funnel_id);
        let id = next_seq(&tx, make_id_seq_key(ns.as_slice()))?;
        let step = FunnelStep {
            id,
            funnel_id,
            name: req.name,
            kind: req.kind,
            descriptor: req.descriptor,
            created_at: Utc::now(),
        };
        tx.put(
            make_data_value_key(ns.as_slice(), step.id),
            serialize(&step)?,
        )?;
        tx.commit()?;

        Ok(step)
    }

    pub fn get_step(&self, website_id: &str, funnel_id: u64, id: u64) -> Result<FunnelStep> {
        let tx = self.db.transaction();

        self.get_step_(&tx, website_id, funnel_id, id)
    }

    /// Steps of the funnel, ascending by creation time. Ties are broken by id which is
    /// handed out in creation order.
    pub fn list_steps(&self, website_id: &str, funnel_id: u64) -> Result<Vec<FunnelStep>> {
        let tx = self.db.transaction();
        self.get_by_id_(&tx, website_id, funnel_id)?;

        let mut steps: Vec<FunnelStep> =
            list_data(&tx, steps_ns(website_id, funnel_id).as_slice())?;
        steps.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        Ok(steps)
    }

    pub fn delete_step(&self, website_id: &str, funnel_id: u64, id: u64) -> Result<FunnelStep> {
        let tx = self.db.transaction();
        let step = self.get_step_(&tx, website_id, funnel_id, id)?;
        tx.delete(make_data_value_key(
            steps_ns(website_id, funnel_id).as_slice(),
            id,
        ))?;
        tx.commit()?;

        Ok(step)
    }

    pub fn count_steps(&self, website_id: &str, funnel_id: u64) -> Result<usize> {
        let tx = self.db.transaction();
        let prefix = make_data_key(steps_ns(website_id, funnel_id).as_slice());
        let mut n = 0;
        for kv in tx.prefix_iterator(prefix.clone()) {
            let (key, _) = kv?;
            if !key.starts_with(&prefix) {
                break;
            }
            n += 1;
        }

        Ok(n)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Page,
    Goal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Funnel {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub website_id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunnelRequest {
    pub created_by: Option<String>,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStep {
    pub id: u64,
    pub funnel_id: u64,
    pub name: String,
    pub kind: StepKind,
    pub descriptor: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunnelStepRequest {
    pub name: String,
    pub kind: StepKind,
    pub descriptor: String,
}
