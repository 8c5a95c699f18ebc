//! In-memory backend for testing and development
//!
//! Interprets the filter query grammar against JSON projections of the
//! records, so the full filter → serialize → fetch loop runs without a
//! remote endpoint. Matching is approximate where the real endpoint has
//! server-side semantics: `__recursive` is treated as a prefix match, since
//! the location hierarchy it walks lives on the server.

use crate::core::query::{ListQuery, ListResponse};
use crate::core::record::{ListClient, Record, RecordFetcher};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory list backend
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryBackend<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T: Record + Serialize> InMemoryBackend<T> {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn insert(&self, record: T) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        records.push(record);
        Ok(())
    }

    pub fn remove(&self, id: &Uuid) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        records.retain(|record| &record.id() != id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Record + Serialize> Default for InMemoryBackend<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record + Serialize> ListClient<T> for InMemoryBackend<T> {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matched: Vec<(Value, T)> = records
            .iter()
            .filter_map(|record| {
                let projected = serde_json::to_value(record).ok()?;
                let matches = query
                    .filters
                    .iter()
                    .all(|(param, expected)| matches_param(&projected, param, expected));
                matches.then(|| (projected, record.clone()))
            })
            .collect();

        if let Some(ordering) = &query.ordering {
            apply_ordering(&mut matched, ordering);
        }

        let count = matched.len();
        let results = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|(_, record)| record)
            .collect();
        Ok(ListResponse { count, results })
    }
}

#[async_trait]
impl<T: Record + Serialize> RecordFetcher<T> for InMemoryBackend<T> {
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(records
            .iter()
            .filter(|record| ids.contains(&record.id()))
            .cloned()
            .collect())
    }
}

/// Operator suffixes of the filter grammar
const OPERATORS: &[&str] = &[
    "icontains",
    "startswith",
    "recursive",
    "in",
    "gte",
    "lte",
    "lt",
];

fn matches_param(record: &Value, param: &str, expected: &str) -> bool {
    let (path, operator) = match param.rsplit_once("__") {
        Some((path, suffix)) if OPERATORS.contains(&suffix) => (path, suffix),
        _ => (param, "exact"),
    };

    let Some(actual) = field_value(record, path) else {
        return false;
    };

    match operator {
        "icontains" => stringify(&actual)
            .to_lowercase()
            .contains(&expected.to_lowercase()),
        // the hierarchy walk happens server-side; locally a recursive match
        // degrades to a prefix match
        "startswith" | "recursive" => stringify(&actual).starts_with(expected),
        "in" => {
            let actual = stringify(&actual);
            expected.split(',').any(|token| token == actual)
        }
        "gte" => compare(&actual, expected) != Ordering::Less,
        "lte" => compare(&actual, expected) != Ordering::Greater,
        "lt" => compare(&actual, expected) == Ordering::Less,
        _ => exact_match(&actual, expected),
    }
}

fn exact_match(actual: &Value, expected: &str) -> bool {
    // metadata filters send "name__value," pair lists against a field that
    // projects as an array of {name, value} objects
    if let Value::Array(pairs) = actual {
        return metadata_match(pairs, expected);
    }
    let actual = stringify(actual);
    if expected.contains(char::is_whitespace) {
        // a batch of whitespace-separated exact identifiers
        return expected.split_whitespace().any(|token| token == actual);
    }
    actual == expected
}

fn metadata_match(pairs: &[Value], expected: &str) -> bool {
    expected
        .split(',')
        .filter(|entry| !entry.is_empty())
        .all(|entry| {
            let (name, value) = entry.split_once("__").unwrap_or((entry, ""));
            pairs.iter().any(|pair| {
                let pair_name = pair.get("name").map(stringify).unwrap_or_default();
                let pair_value = pair.get("value").map(stringify).unwrap_or_default();
                pair_name == name && (value.is_empty() || pair_value == value)
            })
        })
}

/// Resolve a field path against a record projection.
///
/// A flat field wins; otherwise `__` segments walk nested objects, the way
/// relation paths do on the server.
fn field_value(record: &Value, path: &str) -> Option<Value> {
    if let Some(value) = record.get(path) {
        return Some(value.clone());
    }
    let mut current = record.clone();
    for part in path.split("__") {
        current = current.get(part)?.clone();
    }
    Some(current)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare(actual: &Value, expected: &str) -> Ordering {
    let actual = stringify(actual);
    if let (Ok(a), Ok(b)) = (actual.parse::<f64>(), expected.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    // ISO dates and plain strings compare lexicographically
    actual.as_str().cmp(expected)
}

fn apply_ordering<T>(matched: &mut [(Value, T)], ordering: &str) {
    // stable multi-key sort: apply keys in reverse priority order
    for key in ordering.split(',').rev() {
        let (field, descending) = match key.strip_prefix('-') {
            Some(field) => (field, true),
            None => (key, false),
        };
        matched.sort_by(|(a, _), (b, _)| {
            let ordering = compare_fields(a, b, field);
            if descending { ordering.reverse() } else { ordering }
        });
    }
}

fn compare_fields(a: &Value, b: &Value, field: &str) -> Ordering {
    match (field_value(a, field), field_value(b, field)) {
        (Some(a), Some(b)) => compare(&a, &stringify(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::{FilterDescription, FilterKind, FilterSet, FilterValue};
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct Sample {
        id: Uuid,
        name: String,
        status: String,
        concentration: f64,
    }

    impl Record for Sample {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn sample(name: &str, status: &str, concentration: f64) -> Sample {
        Sample {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: status.to_string(),
            concentration,
        }
    }

    fn backend() -> InMemoryBackend<Sample> {
        InMemoryBackend::with_records(vec![
            sample("alpha", "active", 1.5),
            sample("beta", "active", 7.0),
            sample("gamma", "archived", 12.0),
        ])
    }

    fn query_with(key: &str, value: FilterValue, kind: FilterKind) -> ListQuery {
        let mut filters = FilterSet::new();
        filters.set(key, Some(value), FilterDescription::new(kind, key));
        ListQuery::build(&filters, &[], 1, 20).unwrap()
    }

    #[tokio::test]
    async fn test_icontains_matches_substring() {
        let query = query_with("name", FilterValue::text("alph"), FilterKind::Input);
        let page = backend().list(&query).await.unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "alpha");
    }

    #[tokio::test]
    async fn test_range_bounds_filter_numerically() {
        let query = query_with(
            "concentration",
            FilterValue::range(Some("2"), Some("10")),
            FilterKind::Range,
        );
        let page = backend().list(&query).await.unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "beta");
    }

    #[tokio::test]
    async fn test_batch_value_matches_any_token() {
        let mut description = FilterDescription::new(FilterKind::Input, "name");
        description.batch = true;
        let mut filters = FilterSet::new();
        filters.set(
            "name",
            Some(FilterValue::text("alpha gamma")),
            description,
        );
        let query = ListQuery::build(&filters, &[], 1, 20).unwrap();
        let page = backend().list(&query).await.unwrap();

        assert_eq!(page.count, 2);
    }

    #[tokio::test]
    async fn test_ordering_and_pagination() {
        let backend = backend();
        let mut filters = FilterSet::new();
        filters.set(
            "status",
            Some(FilterValue::text("active")),
            FilterDescription::new(FilterKind::Select, "status"),
        );
        let sort_by = vec![crate::core::sort::SortBy::descend("concentration")];
        let query = ListQuery::build(&filters, &sort_by, 1, 1).unwrap();
        let page = backend.list(&query).await.unwrap();

        // two matches, page of one, highest concentration first
        assert_eq!(page.count, 2);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name, "beta");
    }

    #[tokio::test]
    async fn test_fetch_by_ids_omits_unknown() {
        let backend = backend();
        let known = {
            let query = ListQuery::build(&FilterSet::new(), &[], 1, 20).unwrap();
            backend.list(&query).await.unwrap().results[0].id()
        };

        let fetched = backend
            .fetch_by_ids(&[known, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id(), known);
    }
}
