//! Configuration loading for per-table filter catalogs

use crate::core::error::{ConfigError, ListwiseResult};
use crate::core::filter::{FilterDescription, FilterKind, SelectOption};
use crate::registry::FilterRegistry;
use serde::{Deserialize, Serialize};

/// One filterable column in a table catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Stable column identity the UI refers to
    pub column: String,

    /// Server-side filter key; omitted when the mapping is not yet known
    #[serde(default)]
    pub key: Option<String>,

    /// Human-readable label
    pub label: String,

    /// Filter kind
    pub kind: FilterKind,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub batch: bool,

    #[serde(default)]
    pub recursive: bool,

    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl FilterEntry {
    /// Build the runtime description for this entry
    pub fn description(&self) -> FilterDescription {
        let mut description = FilterDescription::new(self.kind, self.label.clone());
        description.multiple = self.multiple;
        description.batch = self.batch;
        description.recursive = self.recursive;
        description.options = self.options.clone();
        description
    }
}

/// Filter catalog for one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name (e.g., "samples", "containers")
    pub table: String,

    /// Filterable columns of the table
    pub filters: Vec<FilterEntry>,
}

/// Complete filter-catalog configuration for an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Catalogs, one per table
    pub tables: Vec<TableConfig>,
}

impl FiltersConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> ListwiseResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ListwiseResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::ParseError {
                file: None,
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Find the catalog for one table
    pub fn table(&self, name: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|table| table.table == name)
    }

    /// Build the filter registry for one table
    pub fn registry_for(&self, table: &str) -> ListwiseResult<FilterRegistry> {
        let Some(config) = self.table(table) else {
            return Err(ConfigError::UnknownTable {
                table: table.to_string(),
            }
            .into());
        };

        let mut registry = FilterRegistry::new();
        for entry in &config.filters {
            registry.register(entry.column.clone(), entry.description());
            if let Some(key) = &entry.key {
                registry.bind_key(entry.column.clone(), key.clone());
            }
        }
        Ok(registry)
    }

    /// Create a default configuration for testing
    pub fn default_config() -> Self {
        Self {
            tables: vec![
                TableConfig {
                    table: "samples".to_string(),
                    filters: vec![
                        FilterEntry {
                            column: "name".to_string(),
                            key: Some("name".to_string()),
                            label: "Name".to_string(),
                            kind: FilterKind::Input,
                            multiple: false,
                            batch: true,
                            recursive: false,
                            options: Vec::new(),
                        },
                        FilterEntry {
                            column: "status".to_string(),
                            key: Some("status".to_string()),
                            label: "Status".to_string(),
                            kind: FilterKind::Select,
                            multiple: false,
                            batch: false,
                            recursive: false,
                            options: vec![
                                SelectOption::new("Active", "active"),
                                SelectOption::new("Archived", "archived"),
                            ],
                        },
                        FilterEntry {
                            column: "concentration".to_string(),
                            key: Some("concentration".to_string()),
                            label: "Concentration".to_string(),
                            kind: FilterKind::Range,
                            multiple: false,
                            batch: false,
                            recursive: false,
                            options: Vec::new(),
                        },
                        FilterEntry {
                            column: "created".to_string(),
                            key: Some("created".to_string()),
                            label: "Created".to_string(),
                            kind: FilterKind::DateRange,
                            multiple: false,
                            batch: false,
                            recursive: false,
                            options: Vec::new(),
                        },
                        FilterEntry {
                            column: "project".to_string(),
                            key: Some("project".to_string()),
                            label: "Project".to_string(),
                            kind: FilterKind::InputObjectId,
                            multiple: false,
                            batch: false,
                            recursive: false,
                            options: Vec::new(),
                        },
                        FilterEntry {
                            column: "metadata".to_string(),
                            key: Some("metadata".to_string()),
                            label: "Metadata".to_string(),
                            kind: FilterKind::Metadata,
                            multiple: false,
                            batch: false,
                            recursive: false,
                            options: Vec::new(),
                        },
                    ],
                },
                TableConfig {
                    table: "containers".to_string(),
                    filters: vec![
                        FilterEntry {
                            column: "barcode".to_string(),
                            key: Some("barcode".to_string()),
                            label: "Barcode".to_string(),
                            kind: FilterKind::Input,
                            multiple: false,
                            batch: true,
                            recursive: false,
                            options: Vec::new(),
                        },
                        FilterEntry {
                            column: "kind".to_string(),
                            key: Some("container_type__name".to_string()),
                            label: "Container Type".to_string(),
                            kind: FilterKind::Select,
                            multiple: true,
                            batch: false,
                            recursive: false,
                            options: vec![
                                SelectOption::new("Plate", "plate"),
                                SelectOption::new("Rack", "rack"),
                                SelectOption::new("Freezer", "freezer"),
                            ],
                        },
                        FilterEntry {
                            column: "location".to_string(),
                            key: Some("location__name".to_string()),
                            label: "Location".to_string(),
                            kind: FilterKind::Input,
                            multiple: false,
                            batch: false,
                            recursive: true,
                            options: Vec::new(),
                        },
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FiltersConfig::default_config();

        assert_eq!(config.tables.len(), 2);
        assert!(config.table("samples").is_some());
        assert!(config.table("containers").is_some());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = FiltersConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = FiltersConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.tables.len(), config.tables.len());
        assert_eq!(
            parsed.table("samples").unwrap().filters.len(),
            config.table("samples").unwrap().filters.len()
        );
    }

    #[test]
    fn test_registry_for_builds_bindings() {
        let config = FiltersConfig::default_config();
        let registry = config.registry_for("containers").unwrap();

        assert_eq!(registry.key_for("kind"), Some("container_type__name"));
        let description = registry.description_for("kind").unwrap();
        assert!(description.multiple);
        assert_eq!(description.options.len(), 3);
    }

    #[test]
    fn test_registry_for_unknown_table_fails() {
        let config = FiltersConfig::default_config();
        let err = config.registry_for("plasmids").unwrap_err();
        assert!(err.to_string().contains("plasmids"));
    }

    #[test]
    fn test_entry_without_key_yields_unbound_column() {
        let yaml = r#"
tables:
  - table: indices
    filters:
      - column: sequence
        label: Sequence
        kind: input
"#;
        let config = FiltersConfig::from_yaml_str(yaml).unwrap();
        let registry = config.registry_for("indices").unwrap();

        assert!(registry.description_for("sequence").is_some());
        assert_eq!(registry.key_for("sequence"), None);
    }

    #[test]
    fn test_parse_error_mentions_file() {
        let err = FiltersConfig::from_yaml_file("/nonexistent/filters.yaml").unwrap_err();
        assert!(err.to_string().contains("IO error"));
    }
}
