//! Multi-column sort model and its request representation

use serde::{Deserialize, Serialize};

/// Direction of one sort entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascend,
    Descend,
}

/// One entry of a stable multi-column sort; the first entry of a list has
/// the highest priority.
///
/// `order: None` represents a column whose sort was toggled off. The
/// controller drops such entries before storing; if one reaches the
/// serializer anyway it is treated as ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub key: String,
    pub order: Option<SortOrder>,
}

impl SortBy {
    pub fn ascend(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: Some(SortOrder::Ascend),
        }
    }

    pub fn descend(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: Some(SortOrder::Descend),
        }
    }
}

/// Serialize a sort list into the `ordering` request parameter.
///
/// Descending keys are prefixed with `-`; keys are joined with commas in
/// list order. An empty list serializes to `None` and the parameter is
/// omitted from the request.
pub fn ordering(sort_by: &[SortBy]) -> Option<String> {
    if sort_by.is_empty() {
        return None;
    }
    let joined = sort_by
        .iter()
        .map(|entry| match entry.order {
            Some(SortOrder::Descend) => format!("-{}", entry.key),
            _ => entry.key.clone(),
        })
        .collect::<Vec<_>>()
        .join(",");
    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_prefixes_descending_keys() {
        let sort_by = vec![SortBy::descend("created"), SortBy::ascend("name")];
        assert_eq!(ordering(&sort_by).as_deref(), Some("-created,name"));
    }

    #[test]
    fn test_ordering_empty_list_is_omitted() {
        assert_eq!(ordering(&[]), None);
    }

    #[test]
    fn test_ordering_preserves_priority_order() {
        let sort_by = vec![SortBy::ascend("a"), SortBy::descend("b"), SortBy::ascend("c")];
        assert_eq!(ordering(&sort_by).as_deref(), Some("a,-b,c"));
    }

    #[test]
    fn test_ordering_unordered_entry_serializes_plain() {
        let sort_by = vec![SortBy {
            key: "name".to_string(),
            order: None,
        }];
        assert_eq!(ordering(&sort_by).as_deref(), Some("name"));
    }
}
