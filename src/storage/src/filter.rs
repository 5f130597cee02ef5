use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;

use crate::record::Field;
use crate::record::Record;

/// Single comparison against one field of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Equal(Field, String),
    NotEqual(Field, String),
    StartsWith(Field, String),
    EndsWith(Field, String),
    Contains(Field, String),
    NotContains(Field, String),
    // case-insensitive, every whitespace separated term must occur
    Search(Field, String),
    GreaterThan(Field, DateTime<Utc>),
    In(Field, HashSet<String>),
}

impl Condition {
    pub fn field(&self) -> Field {
        match self {
            Condition::Equal(f, _)
            | Condition::NotEqual(f, _)
            | Condition::StartsWith(f, _)
            | Condition::EndsWith(f, _)
            | Condition::Contains(f, _)
            | Condition::NotContains(f, _)
            | Condition::Search(f, _)
            | Condition::GreaterThan(f, _)
            | Condition::In(f, _) => *f,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let value = match record.value(self.field()) {
            None => return false,
            Some(v) => v,
        };

        let s = value.as_str();
        match self {
            Condition::GreaterThan(_, ts) => value.as_timestamp().is_some_and(|v| v > *ts),
            Condition::Equal(_, x) => s.is_some_and(|v| v == x),
            Condition::NotEqual(_, x) => s.is_some_and(|v| v != x),
            Condition::StartsWith(_, x) => s.is_some_and(|v| v.starts_with(x.as_str())),
            Condition::EndsWith(_, x) => s.is_some_and(|v| v.ends_with(x.as_str())),
            Condition::Contains(_, x) => s.is_some_and(|v| v.contains(x.as_str())),
            Condition::NotContains(_, x) => s.is_some_and(|v| !v.contains(x.as_str())),
            Condition::Search(_, x) => s.is_some_and(|v| search(v, x)),
            Condition::In(_, set) => s.is_some_and(|v| set.contains(v)),
        }
    }
}

fn search(haystack: &str, pattern: &str) -> bool {
    let haystack = haystack.to_lowercase();
    pattern
        .split_whitespace()
        .all(|term| haystack.contains(term.to_lowercase().as_str()))
}

/// Conjunction of conditions. An empty filter matches every record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, cond: Condition) -> Self {
        self.conditions.push(cond);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Value of the first equality condition on `field`, used by stores to narrow scans.
    pub fn equal_value(&self, field: Field) -> Option<&str> {
        self.conditions.iter().find_map(|c| match c {
            Condition::Equal(f, v) if *f == field => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}
