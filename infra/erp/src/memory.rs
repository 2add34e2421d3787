//! In-process backend evaluating domains over fixture records.
//!
//! A fixture is a JSON document:
//!
//! ```json
//! {
//!   "today": "2025-01-15",
//!   "relations": { "product.product": { "template": "product.template" } },
//!   "models": { "product.template": [ { "id": 1, "name": "Rust" } ] }
//! }
//! ```
//!
//! `relations` tells which model a many2one/x2many field points to so dotted fields
//! (`template.esale_active`) can be followed.

use crate::backend::{ErpBackend, ErpContext};
use crate::codec::normalize;
use crate::domain::{Clause, Direction, Operator, Order, Query};
use crate::error::{ErpError, ErpErrorExt};
use crate::record::Record;
use async_trait::async_trait;
use chrono::NaiveDate;
use fxhash::FxHashMap;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub today: Option<NaiveDate>,
    /// model -> field -> target model
    pub relations: BTreeMap<String, BTreeMap<String, String>>,
    pub models: BTreeMap<String, Vec<Record>>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    models: FxHashMap<String, Vec<Record>>,
    relations: FxHashMap<String, FxHashMap<String, String>>,
    today: Option<NaiveDate>,
}

impl MemoryBackend {
    /// # Errors
    /// [`ErpError::Io`] or [`ErpError::Decode`] when the file cannot be loaded.
    pub fn from_fixture(path: impl AsRef<Path>) -> Result<Self, ErpError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(format!("Reading {}", path.display()))?;
        let fixture: Fixture =
            serde_json::from_str(&raw).context(format!("Parsing {}", path.display()))?;
        Ok(Self::from(fixture))
    }

    fn records(&self, model: &str) -> &[Record] {
        self.models.get(model).map_or(&[], Vec::as_slice)
    }

    fn find(&self, model: &str, id: i64) -> Option<&Record> {
        self.records(model).iter().find(|record| record.id() == Some(id))
    }

    fn target(&self, model: &str, field: &str) -> Option<&str> {
        self.relations.get(model)?.get(field).map(String::as_str)
    }

    /// Value of a (possibly dotted) field; x2many hops yield arrays.
    fn resolve(&self, model: &str, record: &Record, path: &str) -> Value {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        let value = match record.get(head) {
            Some(value) => value.clone(),
            None if head == "rec_name" => record.get("name").cloned().unwrap_or(Value::Null),
            None => Value::Null,
        };
        let Some(rest) = rest else {
            return value;
        };
        let Some(target) = self.target(model, head) else {
            return Value::Null;
        };

        let follow = |id: Option<i64>| {
            id.and_then(|id| self.find(target, id))
                .map_or(Value::Null, |related| self.resolve(target, related, rest))
        };
        match value {
            Value::Array(ids) if !is_many2one_pair(&ids) => Value::Array(
                ids.iter()
                    .map(|id| follow(id.as_i64()))
                    .flat_map(|v| match v {
                        Value::Array(inner) => inner,
                        other => vec![other],
                    })
                    .collect(),
            ),
            other => follow(many2one_id(&other)),
        }
    }

    fn matches(&self, model: &str, record: &Record, clause: &Clause) -> Result<bool, ErpError> {
        let lhs = self.resolve(model, record, &clause.field);
        let rhs = normalize(clause.value.clone());

        let result = match clause.operator {
            Operator::Eq => any(&lhs, |v| loose_eq(v, &rhs)),
            Operator::Ne => !any(&lhs, |v| loose_eq(v, &rhs)),
            Operator::In => any(&lhs, |v| members(&rhs).iter().any(|m| loose_eq(v, m))),
            Operator::NotIn => !any(&lhs, |v| members(&rhs).iter().any(|m| loose_eq(v, m))),
            Operator::Lt => any(&lhs, |v| compare(v, &rhs) == Some(Ordering::Less)),
            Operator::Le => any(&lhs, |v| matches!(compare(v, &rhs), Some(Ordering::Less | Ordering::Equal))),
            Operator::Gt => any(&lhs, |v| compare(v, &rhs) == Some(Ordering::Greater)),
            Operator::Ge => {
                any(&lhs, |v| matches!(compare(v, &rhs), Some(Ordering::Greater | Ordering::Equal)))
            },
            Operator::Like | Operator::ILike | Operator::NotLike | Operator::NotILike => {
                let insensitive = matches!(clause.operator, Operator::ILike | Operator::NotILike);
                let negated = matches!(clause.operator, Operator::NotLike | Operator::NotILike);
                let pattern = like_pattern(rhs.as_str().unwrap_or_default(), insensitive)?;
                let hit = any(&lhs, |v| v.as_str().is_some_and(|text| pattern.is_match(text)));
                if lhs.is_null() { false } else if negated { !hit } else { hit }
            },
        };
        Ok(result)
    }

    fn select(&self, model: &str, query: &Query) -> Result<Vec<&Record>, ErpError> {
        let mut selected = Vec::new();
        for record in self.records(model) {
            let mut keep = true;
            for clause in &query.domain {
                if !self.matches(model, record, clause)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                selected.push(record);
            }
        }

        let default_order = Order::asc("id");
        let order = if query.order.is_empty() { &default_order } else { &query.order };
        selected.sort_by(|a, b| {
            order
                .iter()
                .map(|(field, direction)| {
                    let ordering = null_first(&self.resolve(model, a, field), &self.resolve(model, b, field));
                    if direction == Direction::Desc { ordering.reverse() } else { ordering }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = query.limit.and_then(|l| usize::try_from(l).ok()).unwrap_or(usize::MAX);
        Ok(selected.into_iter().skip(offset).take(limit).collect())
    }

    fn project(&self, model: &str, record: &Record, fields: &[String]) -> Record {
        let mut row = Record::default();
        row.insert("id", record.id().map_or(Value::Null, Value::from));
        for field in fields {
            row.insert(field.clone(), normalize(self.resolve(model, record, field)));
        }
        row
    }
}

impl From<Fixture> for MemoryBackend {
    fn from(fixture: Fixture) -> Self {
        Self {
            models: fixture
                .models
                .into_iter()
                .map(|(model, records)| {
                    let records = records
                        .into_iter()
                        .map(|record| Record::from_value(normalize(record.into_value())).unwrap_or_default())
                        .collect();
                    (model, records)
                })
                .collect(),
            relations: fixture
                .relations
                .into_iter()
                .map(|(model, fields)| (model, fields.into_iter().collect()))
                .collect(),
            today: fixture.today,
        }
    }
}

fn many2one_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::Array(pair) => pair.first().and_then(Value::as_i64),
        Value::Object(map) => map.get("id").and_then(Value::as_i64),
        _ => None,
    }
}

fn is_many2one_pair(items: &[Value]) -> bool {
    matches!(items, [Value::Number(_), Value::String(_)])
}

/// x2many values match when any element does.
fn any(value: &Value, predicate: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) if !is_many2one_pair(items) => {
            if items.is_empty() { predicate(&Value::Null) } else { items.iter().any(predicate) }
        },
        Value::Array(pair) => pair.first().is_some_and(predicate),
        other => predicate(other),
    }
}

fn members(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn null_first(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

/// SQL `LIKE` pattern: `%` any run, `_` one character, `\` escapes.
fn like_pattern(pattern: &str, case_insensitive: bool) -> Result<Regex, ErpError> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    regex.push_str(&regex::escape(&escaped.to_string()));
                }
            },
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');

    RegexBuilder::new(&regex)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| ErpError::Validation {
            message: e.to_string().into(),
            context: Some(format!("like pattern '{pattern}'").into()),
        })
}

#[async_trait]
impl ErpBackend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn search(&self, model: &str, query: &Query, _ctx: &ErpContext) -> Result<Vec<i64>, ErpError> {
        Ok(self.select(model, query)?.into_iter().filter_map(Record::id).collect())
    }

    async fn search_count(&self, model: &str, query: &Query, _ctx: &ErpContext) -> Result<u64, ErpError> {
        let unbounded = Query { offset: 0, limit: None, ..query.clone() };
        Ok(u64::try_from(self.select(model, &unbounded)?.len()).unwrap_or(u64::MAX))
    }

    async fn read(
        &self,
        model: &str,
        ids: &[i64],
        fields: &[String],
        _ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError> {
        ids.iter()
            .map(|&id| {
                self.find(model, id).map(|record| self.project(model, record, fields)).ok_or_else(|| {
                    ErpError::Rpc {
                        message: format!("{model},{id} does not exist").into(),
                        context: Some("read".into()),
                    }
                })
            })
            .collect()
    }

    async fn search_read(
        &self,
        model: &str,
        query: &Query,
        fields: &[String],
        _ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError> {
        Ok(self.select(model, query)?.into_iter().map(|r| self.project(model, r, fields)).collect())
    }

    async fn today(&self, _ctx: &ErpContext) -> Result<NaiveDate, ErpError> {
        Ok(self.today.unwrap_or_else(|| chrono::Local::now().date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_translates_wildcards() {
        let p = like_pattern("%rust_1%", false).unwrap();
        assert!(p.is_match("intro to rust 101"));
        assert!(!p.is_match("intro to Rust 101"));
        assert!(like_pattern("%rust%", true).unwrap().is_match("RUST"));
    }

    #[test]
    fn like_escapes_regex_metacharacters() {
        let p = like_pattern("c++ (advanced)", false).unwrap();
        assert!(p.is_match("c++ (advanced)"));
        assert!(!p.is_match("cc (advanced)"));
        assert!(like_pattern("100\\%", false).unwrap().is_match("100%"));
    }

    #[test]
    fn nulls_sort_first() {
        assert_eq!(null_first(&Value::Null, &Value::from(1)), Ordering::Less);
        assert_eq!(null_first(&Value::from("b"), &Value::from("a")), Ordering::Greater);
    }

    #[test]
    fn tagged_fixture_values_compare_as_plain_dates() {
        let fixture: Fixture = serde_json::from_value(serde_json::json!({
            "models": { "product.product": [
                { "id": 1, "training_start_date": { "__class__": "date", "year": 2025, "month": 4, "day": 10 } }
            ] }
        }))
        .unwrap();
        let backend = MemoryBackend::from(fixture);

        let date = chrono::NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let clause = Clause::new("training_start_date", Operator::Eq, crate::codec::date(date));
        let record = &backend.records("product.product")[0];
        assert!(backend.matches("product.product", record, &clause).unwrap());
        assert_eq!(record.str("training_start_date"), Some("2025-04-10"));
    }
}
