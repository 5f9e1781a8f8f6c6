//! Predicate compiler.
//!
//! Turns a resource's [`FilterRuleSet`] and the caller's raw filter values
//! into one `$match` document: the AND of one clause per non-empty filter,
//! plus the lifecycle clause when requested.

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};

use super::registry::{FilterRule, FilterRuleSet};
use super::types::{FilterValue, OperatorKind, RawFilterValues};

/// Soft-delete flag carried by most resources.
pub const REMOVED_FIELD: &str = "removed";

/// A composed query predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate(Document);

impl Predicate {
    /// Predicate matching every document.
    pub fn match_all() -> Self {
        Self(Document::new())
    }

    /// AND of `clauses`: `{}` for none, the clause itself for one,
    /// `{$and: [...]}` otherwise.
    pub fn all_of(mut clauses: Vec<Document>) -> Self {
        match clauses.len() {
            0 => Self::match_all(),
            1 => Self(clauses.remove(0)),
            _ => Self(doc! { "$and": clauses }),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

/// Compile filter values against `rules`.
///
/// Values for fields without a rule are ignored. Empty values, and values
/// whose shape does not fit the rule's operator, contribute no constraint.
/// With `enforce_not_removed`, `removed = false` is ANDed in last.
pub fn compile_predicate(
    rules: &FilterRuleSet,
    values: &RawFilterValues,
    enforce_not_removed: bool,
) -> Predicate {
    let mut clauses = Vec::new();
    for rule in rules.iter() {
        let Some(value) = values.get(&rule.field) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match compile_rule(rule, value, rules.languages()) {
            Some(clause) => clauses.push(clause),
            None => tracing::debug!(
                field = %rule.field,
                kind = ?rule.kind,
                "filter value applies no constraint"
            ),
        }
    }

    if enforce_not_removed {
        clauses.push(field_clause(REMOVED_FIELD, false));
    }
    Predicate::all_of(clauses)
}

fn compile_rule(rule: &FilterRule, value: &FilterValue, languages: &[String]) -> Option<Document> {
    match rule.kind {
        OperatorKind::String => {
            let prefix = value.as_str()?;
            if rule.language_aware && !languages.is_empty() {
                let branches: Vec<Document> = languages
                    .iter()
                    .map(|lang| {
                        field_clause(&format!("{}.{lang}", rule.path), prefix_match(prefix))
                    })
                    .collect();
                Some(doc! { "$or": branches })
            } else {
                Some(field_clause(&rule.path, prefix_match(prefix)))
            }
        }
        OperatorKind::Exact => {
            let scalar = scalar(value, rule.object_ids)?;
            Some(field_clause(&rule.path, scalar))
        }
        OperatorKind::Array => {
            let members = members(value, rule.object_ids)?;
            Some(field_clause(&rule.path, doc! { "$in": members }))
        }
        OperatorKind::Number => Some(field_clause(&rule.path, number(value)?)),
        OperatorKind::DateRange => {
            // A one-sided range applies no constraint.
            let FilterValue::Range(range) = value else {
                return None;
            };
            let (from, to) = range.bounds()?;
            Some(field_clause(
                &rule.path,
                doc! {
                    "$gte": bson::DateTime::from_millis(from.timestamp_millis()),
                    "$lte": bson::DateTime::from_millis(to.timestamp_millis()),
                },
            ))
        }
        OperatorKind::BooleanArray => {
            let flags = match value {
                FilterValue::Booleans(flags) => flags.clone(),
                FilterValue::Boolean(flag) => vec![*flag],
                _ => return None,
            };
            Some(field_clause(&rule.path, doc! { "$in": flags }))
        }
    }
}

fn field_clause(path: &str, condition: impl Into<Bson>) -> Document {
    let mut clause = Document::new();
    clause.insert(path, condition);
    clause
}

/// Anchored, case-insensitive prefix test with regex metacharacters escaped.
fn prefix_match(prefix: &str) -> Document {
    doc! {
        "$regex": format!("^{}", regex::escape(prefix)),
        "$options": "i",
    }
}

fn identifier(value: &str, object_ids: bool) -> Bson {
    if object_ids && let Ok(id) = ObjectId::parse_str(value) {
        return Bson::ObjectId(id);
    }
    Bson::String(value.to_string())
}

fn scalar(value: &FilterValue, object_ids: bool) -> Option<Bson> {
    match value {
        FilterValue::Boolean(b) => Some(Bson::Boolean(*b)),
        FilterValue::Integer(i) => Some(Bson::Int64(*i)),
        FilterValue::Float(f) => Some(Bson::Double(*f)),
        FilterValue::String(s) => Some(identifier(s, object_ids)),
        _ => None,
    }
}

fn members(value: &FilterValue, object_ids: bool) -> Option<Vec<Bson>> {
    match value {
        FilterValue::Strings(items) => {
            Some(items.iter().map(|s| identifier(s, object_ids)).collect())
        }
        FilterValue::String(s) => Some(vec![identifier(s, object_ids)]),
        FilterValue::Booleans(flags) => Some(flags.iter().copied().map(Bson::Boolean).collect()),
        _ => None,
    }
}

fn number(value: &FilterValue) -> Option<Bson> {
    match value {
        FilterValue::Integer(i) => Some(Bson::Int64(*i)),
        FilterValue::Float(f) => Some(Bson::Double(*f)),
        FilterValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Bson::Int64)
                .or_else(|_| s.parse::<f64>().map(Bson::Double))
                .ok()
        }
        _ => None,
    }
}
