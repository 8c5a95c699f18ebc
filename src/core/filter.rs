//! Filter descriptions, values, match-mode options and the per-table store
//!
//! A [`FilterDescription`] is static metadata describing one filterable
//! column. Descriptions are registered per stable column identity, never per
//! server key: server keys are reused across tables with different meanings,
//! so the key binding is resolved late (see [`crate::registry`]).
//!
//! The [`FilterSet`] is the canonical value store for one table. All of its
//! operations are pure state transitions; side effects such as triggering a
//! refetch belong to the controller, not the store.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The kind of filter control a column carries.
///
/// Every kind has exactly one legal [`FilterValue`] shape and exactly one
/// serialization rule. The serializer matches on this enum exhaustively, so
/// adding a kind without a serialization arm is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Free-text input; substring match unless options say otherwise
    Input,
    /// Single- or multi-select dropdown
    Select,
    /// Numeric range with optional bounds
    Range,
    /// Calendar date range; the upper bound includes the whole day
    DateRange,
    /// Numeric identifier lookup
    InputNumber,
    /// Object-id lookup
    InputObjectId,
    /// Structured metadata name/value pairs
    Metadata,
}

/// One choice offered by a [`FilterKind::Select`] filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Callback producing select options at render time
pub type DynamicOptions = Arc<dyn Fn() -> Vec<SelectOption> + Send + Sync>;

/// Static metadata describing one filterable column
///
/// Immutable per table. The flags are only meaningful for certain kinds:
/// `multiple` for [`FilterKind::Select`], `batch` and `recursive` for
/// [`FilterKind::Input`].
#[derive(Clone, Serialize, Deserialize)]
pub struct FilterDescription {
    pub kind: FilterKind,

    /// Human-readable label shown on the filter control
    pub label: String,

    /// SELECT only: allow choosing several values at once
    #[serde(default)]
    pub multiple: bool,

    /// INPUT only: whitespace-separated tokens are sent as a batch of exact
    /// identifiers, bypassing the match mode
    #[serde(default)]
    pub batch: bool,

    /// INPUT only: the column offers a recursive match toggle
    #[serde(default)]
    pub recursive: bool,

    /// Fixed options for SELECT filters
    #[serde(default)]
    pub options: Vec<SelectOption>,

    /// Options computed at render time; takes precedence over `options`
    #[serde(skip)]
    pub dynamic_options: Option<DynamicOptions>,
}

impl FilterDescription {
    pub fn new(kind: FilterKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            multiple: false,
            batch: false,
            recursive: false,
            options: Vec::new(),
            dynamic_options: None,
        }
    }

    /// The options to render, resolving dynamic options over the fixed list
    pub fn resolved_options(&self) -> Vec<SelectOption> {
        match &self.dynamic_options {
            Some(dynamic) => dynamic(),
            None => self.options.clone(),
        }
    }
}

impl fmt::Debug for FilterDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDescription")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("multiple", &self.multiple)
            .field("batch", &self.batch)
            .field("recursive", &self.recursive)
            .field("options", &self.options)
            .field("dynamic_options", &self.dynamic_options.is_some())
            .finish()
    }
}

/// Numeric bounds of a [`FilterKind::Range`] filter, each optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

/// Calendar bounds of a [`FilterKind::DateRange`] filter, each optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<NaiveDate>,
}

/// One name/value pair of a [`FilterKind::Metadata`] filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    pub name: String,
    /// May be empty: an empty value matches records that carry the name at all
    #[serde(default)]
    pub value: String,
}

impl MetadataPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The current value of one filter.
///
/// Exactly one variant is legal per [`FilterKind`]; the serializer logs and
/// drops entries whose value shape does not match their declared kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    /// Free text (INPUT, single SELECT, INPUT_NUMBER, INPUT_OBJECT_ID)
    Text(String),
    /// Multiple selected values (SELECT in multiple mode)
    List(Vec<String>),
    /// Numeric bounds (RANGE)
    Range(RangeBounds),
    /// Calendar bounds (DATE_RANGE)
    Dates(DateBounds),
    /// Metadata name/value pairs (METADATA)
    Metadata(Vec<MetadataPair>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn range(min: Option<impl Into<String>>, max: Option<impl Into<String>>) -> Self {
        FilterValue::Range(RangeBounds {
            min: min.map(Into::into),
            max: max.map(Into::into),
        })
    }

    pub fn dates(min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        FilterValue::Dates(DateBounds { min, max })
    }

    pub fn metadata<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = MetadataPair>,
    {
        FilterValue::Metadata(pairs.into_iter().collect())
    }
}

/// The three mutually-exclusive match modes a text filter can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    StartsWith,
    Recursive,
}

/// Match-mode flags of a text filter.
///
/// Storage keeps whatever it was given; the mutual-exclusion rule is applied
/// at the edge by [`FilterOptions::toggled`], and the serializer resolves any
/// remaining conflict by precedence (`recursive_match` over `starts_with`
/// over `exact_match`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub exact_match: bool,
    #[serde(default)]
    pub starts_with: bool,
    #[serde(default)]
    pub recursive_match: bool,
}

/// Partial update of [`FilterOptions`]; `None` leaves a flag untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptionsPatch {
    pub exact_match: Option<bool>,
    pub starts_with: Option<bool>,
    pub recursive_match: Option<bool>,
}

impl FilterOptions {
    /// Merge a partial update into the stored flags
    pub fn merge(&mut self, patch: FilterOptionsPatch) {
        if let Some(exact_match) = patch.exact_match {
            self.exact_match = exact_match;
        }
        if let Some(starts_with) = patch.starts_with {
            self.starts_with = starts_with;
        }
        if let Some(recursive_match) = patch.recursive_match {
            self.recursive_match = recursive_match;
        }
    }

    /// Build the patch a filter control applies when the user toggles one
    /// match mode.
    ///
    /// Enabling a mode disables the others; toggling [`MatchMode::Recursive`]
    /// drags `starts_with` to the same state, since a recursive match is a
    /// prefix match over a hierarchy.
    pub fn toggled(mode: MatchMode, enabled: bool) -> FilterOptionsPatch {
        match mode {
            MatchMode::Exact => FilterOptionsPatch {
                exact_match: Some(enabled),
                starts_with: Some(false),
                recursive_match: Some(false),
            },
            MatchMode::StartsWith => FilterOptionsPatch {
                exact_match: Some(false),
                starts_with: Some(enabled),
                recursive_match: Some(false),
            },
            MatchMode::Recursive => FilterOptionsPatch {
                exact_match: Some(false),
                starts_with: Some(enabled),
                recursive_match: Some(enabled),
            },
        }
    }
}

/// The live state of one filter: its value, the description it was set
/// under, and the match-mode options
#[derive(Debug, Clone)]
pub struct FilterSetting {
    pub value: Option<FilterValue>,
    pub description: FilterDescription,
    pub options: FilterOptions,
}

/// The live collection of filter values for one table, keyed by server-side
/// filter key.
///
/// Entries keep insertion order so serialization output is deterministic.
/// All operations are pure state transitions.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    entries: IndexMap<String, FilterSetting>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored value for `key`, recording the description for
    /// later serialization. Match-mode options already set for the key are
    /// preserved.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: Option<FilterValue>,
        description: FilterDescription,
    ) {
        let key = key.into();
        let options = self
            .entries
            .get(&key)
            .map(|entry| entry.options)
            .unwrap_or_default();
        self.entries.insert(
            key,
            FilterSetting {
                value,
                description,
                options,
            },
        );
    }

    /// Merge match-mode flags for `key`, creating the entry (with no value)
    /// if it does not exist yet
    pub fn set_options(
        &mut self,
        key: impl Into<String>,
        patch: FilterOptionsPatch,
        description: FilterDescription,
    ) {
        let entry = self.entries.entry(key.into()).or_insert_with(|| FilterSetting {
            value: None,
            description,
            options: FilterOptions::default(),
        });
        entry.options.merge(patch);
    }

    /// Delete a single entry
    pub fn remove(&mut self, key: &str) -> Option<FilterSetting> {
        self.entries.shift_remove(key)
    }

    /// Empty the whole set
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, key: &str) -> Option<&FilterSetting> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterSetting)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
