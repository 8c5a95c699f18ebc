//! Column definitions merged with their filter contracts
//!
//! [`bind_columns`] attaches the correct filter contract and sort flag to
//! each column definition using the table's [`FilterRegistry`] and the live
//! [`FilterSet`]. Columns without a registered description pass through
//! unmodified.

use crate::core::filter::{FilterDescription, FilterOptions, FilterSet, FilterValue};
use crate::registry::FilterRegistry;

/// One column of a table view, tagged with its stable identity
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Stable column identity used for registry lookups
    pub id: String,

    /// Column header
    pub title: String,

    /// Explicit sort override; `None` means "sortable if the column filters"
    pub sortable: Option<bool>,
}

impl ColumnDef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sortable: None,
        }
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }
}

/// The filter contract attached to one bound column
#[derive(Debug, Clone)]
pub struct ColumnFilter {
    /// Server-side filter key, resolved from the registry's key map
    pub key: String,

    pub description: FilterDescription,

    /// Current committed value read from the filter set
    pub value: Option<FilterValue>,

    /// Current match-mode flags read from the filter set
    pub options: FilterOptions,
}

/// A column ready for rendering: the original definition plus its resolved
/// filter contract, if any
#[derive(Debug, Clone)]
pub struct BoundColumn {
    pub id: String,
    pub title: String,
    pub sortable: bool,
    pub filter: Option<ColumnFilter>,
}

/// Attach filter contracts to a table's columns.
///
/// A column whose description has no resolvable server key is a
/// configuration problem: it is logged as a warning and the column renders
/// without working filtering. The sort flag defaults to true for any column
/// with a working filter unless explicitly overridden on the definition.
pub fn bind_columns(
    columns: &[ColumnDef],
    registry: &FilterRegistry,
    filters: &FilterSet,
) -> Vec<BoundColumn> {
    columns
        .iter()
        .map(|column| {
            let filter = registry.description_for(&column.id).and_then(|description| {
                let Some(key) = registry.key_for(&column.id) else {
                    tracing::warn!(
                        column = %column.id,
                        "filter description has no server key binding; column will not filter"
                    );
                    return None;
                };
                let setting = filters.get(key);
                Some(ColumnFilter {
                    key: key.to_string(),
                    description: description.clone(),
                    value: setting.and_then(|setting| setting.value.clone()),
                    options: setting.map(|setting| setting.options).unwrap_or_default(),
                })
            });

            BoundColumn {
                id: column.id.clone(),
                title: column.title.clone(),
                sortable: column.sortable.unwrap_or(filter.is_some()),
                filter,
            }
        })
        .collect()
}
