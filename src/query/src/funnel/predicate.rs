use std::fmt;
use std::str::FromStr;

use metadata::funnels::StepKind;
use storage::Collection;
use storage::Condition;
use storage::Field;

use crate::error::QueryError;
use crate::Result;

/// Comparison operator of a step descriptor, parsed from its token by exact match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    DoesNotEqual,
    StartsWith,
    EndsWith,
    Contains,
    DoesNotContains,
    WildCardPattern,
    Completes,
    NotCompletes,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::DoesNotEqual => "doesNotEqual",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Contains => "contains",
            Operator::DoesNotContains => "doesNotContains",
            Operator::WildCardPattern => "wildCardPattern",
            Operator::Completes => "completes",
            Operator::NotCompletes => "notCompletes",
        }
    }

    /// Goal aliases collapse onto their page counterparts.
    pub fn normalize(self) -> Self {
        match self {
            Operator::Completes => Operator::Equals,
            Operator::NotCompletes => Operator::DoesNotEqual,
            op => op,
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "equals" => Operator::Equals,
            "doesNotEqual" => Operator::DoesNotEqual,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            "contains" => Operator::Contains,
            "doesNotContains" => Operator::DoesNotContains,
            "wildCardPattern" => Operator::WildCardPattern,
            "completes" => Operator::Completes,
            "notCompletes" => Operator::NotCompletes,
            other => return Err(QueryError::UnsupportedOperator(other.to_string())),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub kind: StepKind,
    pub field: Field,
    pub operator: Operator,
    pub value: String,
}

impl Predicate {
    pub fn collection(&self) -> Collection {
        collection(self.kind)
    }

    pub fn condition(&self) -> Condition {
        let (field, value) = (self.field, self.value.clone());
        match self.operator {
            Operator::Equals | Operator::Completes => Condition::Equal(field, value),
            Operator::DoesNotEqual | Operator::NotCompletes => Condition::NotEqual(field, value),
            Operator::StartsWith => Condition::StartsWith(field, value),
            Operator::EndsWith => Condition::EndsWith(field, value),
            Operator::Contains => Condition::Contains(field, value),
            Operator::DoesNotContains => Condition::NotContains(field, value),
            Operator::WildCardPattern => Condition::Search(field, value),
        }
    }
}

pub fn collection(kind: StepKind) -> Collection {
    match kind {
        StepKind::Page => Collection::Events,
        StepKind::Goal => Collection::Goals,
    }
}

pub fn field(kind: StepKind) -> Field {
    match kind {
        StepKind::Page => Field::Page,
        StepKind::Goal => Field::Name,
    }
}

/// Compiles `operator:value` into a predicate over the field bound to `kind`.
///
/// Only the first `:` separates the operator, the value may contain more of them.
pub fn compile(kind: StepKind, descriptor: &str) -> Result<Predicate> {
    let (token, value) = descriptor.split_once(':').ok_or_else(|| {
        QueryError::MalformedDescriptor(format!("missing separator in {descriptor:?}"))
    })?;
    if token.is_empty() {
        return Err(QueryError::MalformedDescriptor(format!(
            "missing operator in {descriptor:?}"
        )));
    }

    let operator = token.parse::<Operator>()?.normalize();
    let value = match operator {
        Operator::WildCardPattern => value.replace('*', ""),
        _ => value.to_string(),
    };

    Ok(Predicate {
        kind,
        field: field(kind),
        operator,
        value,
    })
}
