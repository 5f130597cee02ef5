use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Collection {
    Events,
    Goals,
    Revenue,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Goals => "goals",
            Collection::Revenue => "revenue",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Id,
    Website,
    VisitorId,
    SessionId,
    CreatedAt,
    // page view
    Page,
    Referrer,
    Title,
    // goal
    Name,
    // revenue
    SubscriptionId,
    Amount,
    Currency,
    RevenueKind,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Value {
    String(String),
    Timestamp(DateTime<Utc>),
    Decimal(Decimal),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }
}

/// Page view.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub website: String,
    pub visitor_id: String,
    pub session_id: String,
    pub page: String,
    pub referrer: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Named conversion.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Goal {
    pub id: String,
    pub website: String,
    pub visitor_id: String,
    pub session_id: Option<String>,
    pub name: String,
    pub custom_params: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevenueKind {
    New,
    Recurring,
}

impl RevenueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueKind::New => "new",
            RevenueKind::Recurring => "recurring",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Revenue {
    pub id: String,
    pub website: String,
    pub visitor_id: String,
    pub session_id: String,
    pub subscription_id: Option<String>,
    // bincode can't drive the default (self-describing) decimal deserializer
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    pub kind: RevenueKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Event(Event),
    Goal(Goal),
    Revenue(Revenue),
}

impl Record {
    pub fn collection(&self) -> Collection {
        match self {
            Record::Event(_) => Collection::Events,
            Record::Goal(_) => Collection::Goals,
            Record::Revenue(_) => Collection::Revenue,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Event(e) => &e.id,
            Record::Goal(g) => &g.id,
            Record::Revenue(r) => &r.id,
        }
    }

    pub fn website(&self) -> &str {
        match self {
            Record::Event(e) => &e.website,
            Record::Goal(g) => &g.website,
            Record::Revenue(r) => &r.website,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::Event(e) => e.created_at,
            Record::Goal(g) => g.created_at,
            Record::Revenue(r) => r.created_at,
        }
    }

    /// Returns the value of `field`, `None` if the record kind has no such field or it is unset.
    pub fn value(&self, field: Field) -> Option<Value> {
        let s = |v: &str| Some(Value::String(v.to_string()));
        match (self, field) {
            (_, Field::Id) => s(self.id()),
            (_, Field::Website) => s(self.website()),
            (_, Field::CreatedAt) => Some(Value::Timestamp(self.created_at())),
            (Record::Event(e), Field::VisitorId) => s(&e.visitor_id),
            (Record::Event(e), Field::SessionId) => s(&e.session_id),
            (Record::Event(e), Field::Page) => s(&e.page),
            (Record::Event(e), Field::Referrer) => e.referrer.as_deref().and_then(s),
            (Record::Event(e), Field::Title) => e.title.as_deref().and_then(s),
            (Record::Goal(g), Field::VisitorId) => s(&g.visitor_id),
            (Record::Goal(g), Field::SessionId) => g.session_id.as_deref().and_then(s),
            (Record::Goal(g), Field::Name) => s(&g.name),
            (Record::Revenue(r), Field::VisitorId) => s(&r.visitor_id),
            (Record::Revenue(r), Field::SessionId) => s(&r.session_id),
            (Record::Revenue(r), Field::SubscriptionId) => {
                r.subscription_id.as_deref().and_then(s)
            }
            (Record::Revenue(r), Field::Amount) => Some(Value::Decimal(r.amount)),
            (Record::Revenue(r), Field::Currency) => s(&r.currency),
            (Record::Revenue(r), Field::RevenueKind) => s(r.kind.as_str()),
            _ => None,
        }
    }
}

/// Projected query result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    values: BTreeMap<Field, Value>,
}

impl Row {
    pub fn project(record: &Record, select: &[Field]) -> Self {
        let fields: &[Field] = if select.is_empty() {
            &[
                Field::Id,
                Field::Website,
                Field::VisitorId,
                Field::SessionId,
                Field::CreatedAt,
                Field::Page,
                Field::Referrer,
                Field::Title,
                Field::Name,
                Field::SubscriptionId,
                Field::Amount,
                Field::Currency,
                Field::RevenueKind,
            ]
        } else {
            select
        };

        let values = fields
            .iter()
            .filter_map(|f| record.value(*f).map(|v| (*f, v)))
            .collect();

        Row { values }
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    pub fn get_str(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(|v| v.as_str())
    }
}
