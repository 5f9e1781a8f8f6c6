//! In-process evaluation of aggregation pipelines.
//!
//! Covers the stages and query operators the listing compiler emits:
//! `$match`, `$sort`, `$skip`, `$limit`, `$project` (exclusion only),
//! `$facet` and `$count`, with `$and`, `$or`, `$eq`, `$ne`, `$in`, `$nin`,
//! `$gt`, `$gte`, `$lt`, `$lte`, `$exists` and `$regex`/`$options` inside
//! `$match`. Anything else is rejected with [`StoreError::Unsupported`]
//! rather than silently matching.

use std::cmp::Ordering;

use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};

use super::StoreError;

/// Run every stage of `pipeline` over `docs` in order.
pub(super) fn run_pipeline(
    mut docs: Vec<Document>,
    pipeline: &[Document],
) -> Result<Vec<Document>, StoreError> {
    for stage in pipeline {
        docs = run_stage(docs, stage)?;
    }
    Ok(docs)
}

fn run_stage(docs: Vec<Document>, stage: &Document) -> Result<Vec<Document>, StoreError> {
    let mut entries = stage.iter();
    let (name, arg) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(StoreError::InvalidQuery(
                "a pipeline stage must have exactly one field".to_string(),
            ));
        }
    };

    match name.as_str() {
        "$match" => {
            let filter = as_document(name, arg)?;
            let mut matched = Vec::with_capacity(docs.len());
            for doc in docs {
                if matches(&doc, filter)? {
                    matched.push(doc);
                }
            }
            Ok(matched)
        }
        "$sort" => sort(docs, as_document(name, arg)?),
        "$skip" => {
            let n = as_count(name, arg)?;
            Ok(docs.into_iter().skip(n).collect())
        }
        "$limit" => {
            let n = as_count(name, arg)?;
            if n == 0 {
                return Err(StoreError::InvalidQuery(
                    "$limit must be positive".to_string(),
                ));
            }
            Ok(docs.into_iter().take(n).collect())
        }
        "$project" => project(docs, as_document(name, arg)?),
        "$facet" => facet(docs, as_document(name, arg)?),
        "$count" => count(docs, arg),
        other => Err(StoreError::Unsupported(other.to_string())),
    }
}

fn as_document<'a>(stage: &str, arg: &'a Bson) -> Result<&'a Document, StoreError> {
    match arg {
        Bson::Document(doc) => Ok(doc),
        _ => Err(StoreError::InvalidQuery(format!(
            "{stage} requires a document argument"
        ))),
    }
}

fn as_array<'a>(op: &str, arg: &'a Bson) -> Result<&'a [Bson], StoreError> {
    match arg {
        Bson::Array(items) => Ok(items),
        _ => Err(StoreError::InvalidQuery(format!("{op} requires an array"))),
    }
}

fn as_count(stage: &str, arg: &Bson) -> Result<usize, StoreError> {
    let n = match arg {
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        Bson::Double(d) if d.fract() == 0.0 => *d as i64,
        _ => -1,
    };
    usize::try_from(n).map_err(|_| {
        StoreError::InvalidQuery(format!("{stage} requires a non-negative integer"))
    })
}

/// Whether `doc` satisfies the query `filter`.
pub(super) fn matches(doc: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(doc, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if matches(doc, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            op if op.starts_with('$') => return Err(StoreError::Unsupported(op.to_string())),
            path => matches_field(lookup(doc, path), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses<'a>(op: &str, value: &'a Bson) -> Result<Vec<&'a Document>, StoreError> {
    let items = as_array(op, value)?;
    if items.is_empty() {
        return Err(StoreError::InvalidQuery(format!(
            "{op} requires a non-empty array"
        )));
    }
    items
        .iter()
        .map(|item| match item {
            Bson::Document(doc) => Ok(doc),
            _ => Err(StoreError::InvalidQuery(format!(
                "{op} entries must be documents"
            ))),
        })
        .collect()
}

/// Resolve a dotted path through embedded documents.
fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn is_operator_document(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|key| key.starts_with('$'))
}

fn matches_field(value: Option<&Bson>, condition: &Bson) -> Result<bool, StoreError> {
    match condition {
        Bson::Document(ops) if is_operator_document(ops) => {
            for (op, arg) in ops {
                let ok = match op.as_str() {
                    "$eq" => equals(value, arg),
                    "$ne" => !equals(value, arg),
                    "$in" => as_array(op, arg)?.iter().any(|c| equals(value, c)),
                    "$nin" => !as_array(op, arg)?.iter().any(|c| equals(value, c)),
                    "$gt" => compares(value, arg, |o| o == Ordering::Greater),
                    "$gte" => compares(value, arg, |o| o != Ordering::Less),
                    "$lt" => compares(value, arg, |o| o == Ordering::Less),
                    "$lte" => compares(value, arg, |o| o != Ordering::Greater),
                    "$exists" => value.is_some() == truthy(arg),
                    "$regex" => {
                        let regex = build_regex(arg, ops.get("$options"))?;
                        regex_matches(value, &regex)
                    }
                    "$options" => {
                        if !ops.contains_key("$regex") {
                            return Err(StoreError::InvalidQuery(
                                "$options requires $regex".to_string(),
                            ));
                        }
                        true
                    }
                    other => return Err(StoreError::Unsupported(other.to_string())),
                };
                if !ok {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Bson::RegularExpression(_) => {
            let regex = build_regex(condition, None)?;
            Ok(regex_matches(value, &regex))
        }
        other => Ok(equals(value, other)),
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(d) => *d != 0.0,
        Bson::Null => false,
        _ => true,
    }
}

/// Equality with array-element semantics: an array field matches when the
/// whole array or any of its elements equals `target`. A missing field
/// equals `null`.
fn equals(value: Option<&Bson>, target: &Bson) -> bool {
    match value {
        None => matches!(target, Bson::Null),
        Some(v) => {
            same(v, target)
                || matches!(v, Bson::Array(items) if items.iter().any(|item| same(item, target)))
        }
    }
}

fn same(a: &Bson, b: &Bson) -> bool {
    compare_values(a, b) == Some(Ordering::Equal) || a == b
}

fn compares(value: Option<&Bson>, target: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let Some(value) = value else {
        return false;
    };
    let check = |candidate: &Bson| compare_values(candidate, target).is_some_and(&accept);
    match value {
        Bson::Array(items) => items.iter().any(check),
        other => check(other),
    }
}

/// Compare two values of the same type bracket; `None` across brackets.
fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::Int32(_) | Bson::Int64(_), Bson::Int32(_) | Bson::Int64(_)) => {
            Some(as_i64(a)?.cmp(&as_i64(b)?))
        }
        (
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_),
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_),
        ) => as_f64(a)?.partial_cmp(&as_f64(b)?),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            Some(x.timestamp_millis().cmp(&y.timestamp_millis()))
        }
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn build_regex(pattern: &Bson, options: Option<&Bson>) -> Result<Regex, StoreError> {
    let (pattern, mut flags) = match pattern {
        Bson::String(p) => (p.as_str(), String::new()),
        Bson::RegularExpression(re) => (re.pattern.as_str(), re.options.clone()),
        _ => {
            return Err(StoreError::InvalidQuery(
                "$regex requires a string pattern".to_string(),
            ));
        }
    };
    match options {
        Some(Bson::String(extra)) => flags.push_str(extra),
        Some(_) => {
            return Err(StoreError::InvalidQuery(
                "$options must be a string".to_string(),
            ));
        }
        None => {}
    }

    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map_err(|e| StoreError::InvalidQuery(format!("invalid $regex: {e}")))
}

fn regex_matches(value: Option<&Bson>, regex: &Regex) -> bool {
    match value {
        Some(Bson::String(s)) => regex.is_match(s),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(s) if regex.is_match(s))),
        _ => false,
    }
}

fn sort(mut docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>, StoreError> {
    if spec.is_empty() {
        return Err(StoreError::InvalidQuery(
            "$sort requires at least one key".to_string(),
        ));
    }
    let keys = spec
        .iter()
        .map(|(field, direction)| match as_i64(direction).or_else(|| {
            as_f64(direction).filter(|d| d.fract() == 0.0).map(|d| d as i64)
        }) {
            Some(1) => Ok((field.as_str(), true)),
            Some(-1) => Ok((field.as_str(), false)),
            _ => Err(StoreError::InvalidQuery(format!(
                "invalid $sort direction for '{field}'"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    docs.sort_by(|a, b| {
        for (field, ascending) in &keys {
            let ordering = total_order(lookup(a, field), lookup(b, field));
            let ordering = if *ascending {
                ordering
            } else {
                ordering.reverse()
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(docs)
}

/// Cross-type ordering: values of different types order by type bracket,
/// missing fields sort like `null`.
fn total_order(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (rank_a, rank_b) = (type_rank(a), type_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        Some(Bson::MinKey) => 0,
        None | Some(Bson::Null) | Some(Bson::Undefined) => 1,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 2,
        Some(Bson::String(_) | Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(Bson::MaxKey) => 12,
        Some(_) => 11,
    }
}

fn project(mut docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>, StoreError> {
    let mut excluded = Vec::with_capacity(spec.len());
    for (field, flag) in spec {
        if truthy(flag) {
            return Err(StoreError::Unsupported(format!(
                "$project inclusion of '{field}'"
            )));
        }
        excluded.push(field.as_str());
    }
    for doc in &mut docs {
        for path in &excluded {
            remove_path(doc, path);
        }
    }
    Ok(docs)
}

fn remove_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                remove_path(inner, rest);
            }
        }
    }
}

fn facet(docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>, StoreError> {
    let mut output = Document::new();
    for (name, stages) in spec {
        let pipeline = as_array("$facet", stages)?
            .iter()
            .map(|stage| match stage {
                Bson::Document(doc) => Ok(doc.clone()),
                _ => Err(StoreError::InvalidQuery(format!(
                    "$facet branch '{name}' must be an array of stages"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let branch = run_pipeline(docs.clone(), &pipeline)?;
        output.insert(
            name.clone(),
            Bson::Array(branch.into_iter().map(Bson::Document).collect()),
        );
    }
    Ok(vec![output])
}

fn count(docs: Vec<Document>, arg: &Bson) -> Result<Vec<Document>, StoreError> {
    let name = match arg {
        Bson::String(name) if !name.is_empty() && !name.starts_with('$') => name,
        _ => {
            return Err(StoreError::InvalidQuery(
                "$count requires a non-empty field name".to_string(),
            ));
        }
    };
    // An empty input produces no output document at all.
    if docs.is_empty() {
        return Ok(Vec::new());
    }
    let total = i32::try_from(docs.len())
        .map(Bson::Int32)
        .unwrap_or(Bson::Int64(docs.len() as i64));
    let mut out = Document::new();
    out.insert(name.clone(), total);
    Ok(vec![out])
}
