//! In-memory query engine over collection snapshots.
//!
//! Filters are a tagged expression tree rather than an open-ended dictionary:
//! equality, date-aware comparisons, and a logical-OR combinator over
//! sub-filters. Evaluation is a plain O(n) pass over documents already loaded
//! from the store; collections are small, so there is no indexing and no
//! query planning.
//!
//! Population and field projection produce `serde_json::Value` documents,
//! which is the display-ready shape handed to API callers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// A single field value as seen by the query engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Time(DateTime<Utc>),
    Null,
}

/// Typed access to named fields of a document. Unknown fields are `Null`.
pub trait Document {
    fn field(&self, name: &str) -> FieldValue;
}

/// A condition applied to one field. The comparison operators are date-aware:
/// they only hold for temporal fields.
#[derive(Debug, Clone)]
pub enum Cond {
    Eq(FieldValue),
    Lt(DateTime<Utc>),
    Lte(DateTime<Utc>),
    Gt(DateTime<Utc>),
    Gte(DateTime<Utc>),
}

/// A filter over documents: every clause must hold (implicit AND), and if
/// `any_of` alternatives are present, at least one of them must match in full.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Cond)>,
    any_of: Vec<Filter>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field clause (ANDed with the existing ones).
    #[must_use]
    pub fn field(mut self, name: &str, cond: Cond) -> Self {
        self.clauses.push((name.to_string(), cond));
        self
    }

    /// Adds an OR-combinator: the document must satisfy at least one of the
    /// given sub-filters entirely.
    #[must_use]
    pub fn any_of(mut self, alternatives: Vec<Filter>) -> Self {
        self.any_of = alternatives;
        self
    }

    /// Whether the document satisfies this filter.
    pub fn matches<D: Document>(&self, doc: &D) -> bool {
        let clauses_hold = self
            .clauses
            .iter()
            .all(|(name, cond)| cond_holds(&doc.field(name), cond));
        if !clauses_hold {
            return false;
        }
        if self.any_of.is_empty() {
            return true;
        }
        self.any_of.iter().any(|alt| alt.matches(doc))
    }
}

fn cond_holds(value: &FieldValue, cond: &Cond) -> bool {
    match cond {
        Cond::Eq(expected) => value == expected,
        Cond::Lt(bound) => matches!(value, FieldValue::Time(t) if t < bound),
        Cond::Lte(bound) => matches!(value, FieldValue::Time(t) if t <= bound),
        Cond::Gt(bound) => matches!(value, FieldValue::Time(t) if t > bound),
        Cond::Gte(bound) => matches!(value, FieldValue::Time(t) if t >= bound),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

fn time_key(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Time(t) => Some(*t),
        _ => None,
    }
}

/// Compares two documents over the given sort keys. Keys are compared as
/// timestamps; the first differing key decides, ties fall through to the
/// next key.
fn compare_docs<D: Document>(a: &D, b: &D, keys: &[(String, SortDir)]) -> Ordering {
    for (name, dir) in keys {
        let lhs = time_key(&a.field(name));
        let rhs = time_key(&b.field(name));
        let ord = match dir {
            SortDir::Asc => lhs.cmp(&rhs),
            SortDir::Desc => lhs.cmp(&rhs).reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Fluent query over an in-memory snapshot: filter, then sort, then execute
/// explicitly with [`Query::all`] (list mode) or [`Query::one`] (single mode).
pub struct Query<D: Document> {
    docs: Vec<D>,
    filter: Option<Filter>,
    sort_keys: Vec<(String, SortDir)>,
}

impl<D: Document> Query<D> {
    #[must_use]
    pub fn over(docs: Vec<D>) -> Self {
        Self {
            docs,
            filter: None,
            sort_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn sort(mut self, field: &str, dir: SortDir) -> Self {
        self.sort_keys.push((field.to_string(), dir));
        self
    }

    /// Executes in list mode: zero or more matches.
    pub fn all(self) -> Vec<D> {
        let Self {
            mut docs,
            filter,
            sort_keys,
        } = self;
        if let Some(filter) = filter {
            docs.retain(|doc| filter.matches(doc));
        }
        // sort_by is stable; unmatched keys compare equal and keep input order
        docs.sort_by(|a, b| compare_docs(a, b, &sort_keys));
        docs
    }

    /// Executes in single mode: the highest-priority match after filtering
    /// and sorting, or `None`.
    pub fn one(self) -> Option<D> {
        self.all().into_iter().next()
    }
}

/// Projects a document to a subset of named fields.
///
/// Plain names select include-only mode (`_id` is always retained); names
/// prefixed with `-` exclude those fields and pass everything else through.
pub fn project<T: Serialize>(doc: &T, fields: &[&str]) -> Value {
    let Ok(value) = serde_json::to_value(doc) else {
        return Value::Null;
    };
    let Value::Object(map) = value else {
        return value;
    };
    let includes: Vec<&str> = fields
        .iter()
        .filter(|f| !f.starts_with('-'))
        .copied()
        .collect();
    let excludes: Vec<&str> = fields.iter().filter_map(|f| f.strip_prefix('-')).collect();
    let map: serde_json::Map<String, Value> = map
        .into_iter()
        .filter(|(key, _)| {
            if includes.is_empty() {
                !excludes.contains(&key.as_str())
            } else {
                key == "_id" || includes.contains(&key.as_str())
            }
        })
        .collect();
    Value::Object(map)
}

/// Replaces a foreign-key field in each document with the resolved related
/// record, projected to `select` when non-empty. Unresolvable references are
/// left unpopulated (the raw identifier stays in place) rather than failing
/// the result.
pub fn populate<T, R, F>(docs: &[T], field: &str, select: &[&str], mut resolve: F) -> Vec<Value>
where
    T: Serialize,
    R: Serialize,
    F: FnMut(&str) -> Option<R>,
{
    docs.iter()
        .map(|doc| {
            let Ok(mut value) = serde_json::to_value(doc) else {
                return Value::Null;
            };
            if let Value::Object(map) = &mut value {
                let related = match map.get(field) {
                    Some(Value::String(id)) => resolve(id),
                    _ => None,
                };
                if let Some(related) = related {
                    let projected = if select.is_empty() {
                        serde_json::to_value(&related).unwrap_or(Value::Null)
                    } else {
                        project(&related, select)
                    };
                    map.insert(field.to_string(), projected);
                }
            }
            value
        })
        .collect()
}
