//! Query filters ("domains") and ordering in the server's wire shape.

use serde::de::Deserializer;
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Comparison operator of a domain clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "ilike")]
    ILike,
    #[serde(rename = "not like")]
    NotLike,
    #[serde(rename = "not ilike")]
    NotILike,
}

impl Operator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Like => "like",
            Self::ILike => "ilike",
            Self::NotLike => "not like",
            Self::NotILike => "not ilike",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(field, operator, value)`; `field` may traverse relations (`template.esale_active`).
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Clause {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self { field: field.into(), operator, value: value.into() }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.field)?;
        tuple.serialize_element(&self.operator)?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Clause {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (field, operator, value) = <(String, Operator, Value)>::deserialize(deserializer)?;
        Ok(Self { field, operator, value })
    }
}

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(Vec<Clause>);

impl Domain {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder-style [`Self::push`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.push(Clause::new(field, operator, value));
        self
    }

    pub fn push(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Appends every clause of `other`.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Re-targets every clause through a relation: `name` becomes `template.name`.
    #[must_use]
    pub fn prefixed(&self, relation: &str) -> Self {
        self.0
            .iter()
            .map(|clause| Clause {
                field: format!("{relation}.{}", clause.field),
                operator: clause.operator,
                value: clause.value.clone(),
            })
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<Clause> for Domain {
    fn from_iter<I: IntoIterator<Item = Clause>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Domain {
    type Item = Clause;
    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Domain {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// Sort specification, serialized as `[["field", "ASC"], ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(Vec<(String, Direction)>);

impl Order {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self(vec![(field.into(), Direction::Asc)])
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self(vec![(field.into(), Direction::Desc)])
    }

    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.0.push((field.into(), direction));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.0.iter().map(|(field, direction)| (field.as_str(), *direction))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A search: filter, window and order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub domain: Domain,
    pub offset: u64,
    pub limit: Option<u64>,
    pub order: Order,
}

impl Query {
    #[must_use]
    pub fn new(domain: Domain) -> Self {
        Self { domain, ..Self::default() }
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}
