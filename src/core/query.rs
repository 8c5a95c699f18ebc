//! Query-parameter serialization and the list endpoint envelope
//!
//! The list endpoint consumes a flat query-parameter map
//! `{limit, offset, ordering?, ...filterParams}` and answers with
//! `{count, results}`. This module produces the filter parameters from a
//! [`FilterSet`] and assembles complete page requests.
//!
//! # Filter parameter grammar
//!
//! | Filter kind | Params emitted |
//! |---|---|
//! | INPUT (batch, contains whitespace) | `key = raw value` |
//! | INPUT (exact match) | `key = value` |
//! | INPUT (starts with) | `key__startswith = value` |
//! | INPUT (recursive match) | `key__recursive = value` |
//! | INPUT (default) | `key__icontains = value` |
//! | RANGE | `key__gte = min`, `key__lte = max` (each optional) |
//! | DATE_RANGE | `key__gte = min`, `key__lt = max + 1 day` |
//! | SELECT (multiple) | `key__in = a,b,c` |
//! | SELECT (single) | `key = value` |
//! | INPUT_NUMBER / INPUT_OBJECT_ID | `key__in = value` |
//! | METADATA | `key = "n1__v1,n2__v2,"` |

use crate::core::error::{FilterError, ListwiseResult};
use crate::core::filter::{
    FilterDescription, FilterKind, FilterOptions, FilterSet, FilterValue,
};
use crate::core::sort::{SortBy, ordering};
use chrono::Duration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Flat query-parameter map sent to the list endpoint
pub type QueryParams = IndexMap<String, String>;

/// Page size used when none was chosen
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Serialize a [`FilterSet`] into query parameters.
///
/// Pure function: the same set always yields the same parameters. Entries
/// with no value are skipped. Entries whose value shape does not match their
/// declared kind are logged and dropped while the rest of the query
/// proceeds; an empty [`FilterKind::InputNumber`] or
/// [`FilterKind::InputObjectId`] value is a hard error because it signals a
/// caller bug rather than user input.
pub fn serialize_filters(filters: &FilterSet) -> ListwiseResult<QueryParams> {
    let mut params = QueryParams::new();
    for (key, setting) in filters.iter() {
        let Some(value) = &setting.value else {
            continue;
        };
        serialize_filter(
            &mut params,
            key,
            value,
            &setting.description,
            setting.options,
        )?;
    }
    Ok(params)
}

fn serialize_filter(
    params: &mut QueryParams,
    key: &str,
    value: &FilterValue,
    description: &FilterDescription,
    options: FilterOptions,
) -> ListwiseResult<()> {
    match description.kind {
        FilterKind::Input => match value {
            FilterValue::Text(text) => {
                if description.batch && text.contains(char::is_whitespace) {
                    // A pasted batch of whitespace-separated exact identifiers
                    // bypasses the match mode entirely.
                    params.insert(key.to_string(), text.clone());
                } else {
                    let param = if options.recursive_match {
                        format!("{key}__recursive")
                    } else if options.starts_with {
                        format!("{key}__startswith")
                    } else if options.exact_match {
                        key.to_string()
                    } else {
                        format!("{key}__icontains")
                    };
                    params.insert(param, text.clone());
                }
            }
            _ => drop_mismatched(key, description.kind, value),
        },
        FilterKind::Range => match value {
            FilterValue::Range(bounds) => {
                if let Some(min) = &bounds.min {
                    params.insert(format!("{key}__gte"), min.clone());
                }
                if let Some(max) = &bounds.max {
                    params.insert(format!("{key}__lte"), max.clone());
                }
            }
            _ => drop_mismatched(key, description.kind, value),
        },
        FilterKind::DateRange => match value {
            FilterValue::Dates(bounds) => {
                if let Some(min) = bounds.min {
                    params.insert(format!("{key}__gte"), min.format("%Y-%m-%d").to_string());
                }
                if let Some(max) = bounds.max {
                    // The upper bound excludes the day after `max`, so the
                    // whole of day `max` is included.
                    let upper = max + Duration::days(1);
                    params.insert(format!("{key}__lt"), upper.format("%Y-%m-%d").to_string());
                }
            }
            _ => drop_mismatched(key, description.kind, value),
        },
        FilterKind::Select => {
            if description.multiple {
                match value {
                    FilterValue::List(values) => {
                        params.insert(format!("{key}__in"), values.join(","));
                    }
                    _ => drop_mismatched(key, description.kind, value),
                }
            } else {
                match value {
                    FilterValue::Text(selected) => {
                        params.insert(key.to_string(), selected.clone());
                    }
                    _ => drop_mismatched(key, description.kind, value),
                }
            }
        }
        FilterKind::InputNumber | FilterKind::InputObjectId => match value {
            FilterValue::Text(id) if !id.is_empty() => {
                params.insert(format!("{key}__in"), id.clone());
            }
            FilterValue::Text(_) => {
                return Err(FilterError::EmptyValue {
                    key: key.to_string(),
                }
                .into());
            }
            _ => drop_mismatched(key, description.kind, value),
        },
        FilterKind::Metadata => match value {
            FilterValue::Metadata(pairs) => {
                // "name__value," per pair; the trailing separator is
                // tolerated by the receiver.
                let mut joined = String::new();
                for pair in pairs {
                    joined.push_str(&pair.name);
                    joined.push_str("__");
                    joined.push_str(&pair.value);
                    joined.push(',');
                }
                params.insert(key.to_string(), joined);
            }
            _ => drop_mismatched(key, description.kind, value),
        },
    }
    Ok(())
}

fn drop_mismatched(key: &str, kind: FilterKind, value: &FilterValue) {
    let err = FilterError::ValueMismatch {
        key: key.to_string(),
        kind,
    };
    tracing::warn!(error = %err, value = ?value, "dropping filter parameter");
}

/// One list request: serialized filter parameters plus pagination and
/// ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Number of items per page
    pub limit: usize,

    /// Offset of the first item, `(page_number - 1) * limit`
    pub offset: usize,

    /// Sort expression, omitted from the request when `None`
    pub ordering: Option<String>,

    /// Serialized filter parameters
    pub filters: QueryParams,
}

impl ListQuery {
    /// Build the request for one page of a filtered, sorted collection
    pub fn build(
        filters: &FilterSet,
        sort_by: &[SortBy],
        page_number: usize,
        limit: usize,
    ) -> ListwiseResult<Self> {
        let page_number = page_number.max(1);
        Ok(Self {
            limit,
            offset: (page_number - 1) * limit,
            ordering: ordering(sort_by),
            filters: serialize_filters(filters)?,
        })
    }

    /// Flatten into the single query-parameter map the endpoint consumes
    pub fn to_params(&self) -> QueryParams {
        let mut params = self.filters.clone();
        params.insert("limit".to_string(), self.limit.to_string());
        params.insert("offset".to_string(), self.offset.to_string());
        if let Some(ordering) = &self.ordering {
            params.insert("ordering".to_string(), ordering.clone());
        }
        params
    }
}

/// Response envelope of the list endpoint: total match count plus one page
/// of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Total number of records matching the filters, across all pages
    pub count: usize,

    /// The records of the requested page, in collection order
    pub results: Vec<T>,
}
