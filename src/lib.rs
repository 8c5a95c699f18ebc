//! # Listwise
//!
//! A generic filtering, sorting, pagination and query-serialization engine
//! for list views over remote collections.
//!
//! ## Features
//!
//! - **Typed filter model**: one sum type per filter kind, with the
//!   serializer matching exhaustively — new kinds cannot ship without a
//!   serialization rule
//! - **Bit-exact query grammar**: `__icontains`/`__startswith`/
//!   `__recursive` match modes, batch identifier pastes, range and
//!   date-range bounds, multi-select `__in` joins, metadata pair lists
//! - **Paged collection controller**: page/limit/total-count state machine
//!   with generation-guarded fetches, page clamping, and staleness
//!   reconciliation
//! - **Batching resolver**: by-id lookups deduplicated through a shared
//!   cache and coalesced into single batch requests
//! - **Debounced inputs**: keystrokes commit once per quiet period, never
//!   blocking on the network
//! - **Catalog configuration**: per-table filter catalogs defined in code
//!   or loaded from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use listwise::prelude::*;
//! use std::sync::Arc;
//!
//! let config = FiltersConfig::from_yaml_file("filters.yaml")?;
//! let registry = config.registry_for("samples")?;
//!
//! let backend = Arc::new(InMemoryBackend::with_records(samples));
//! let cache = RecordCache::new();
//! let controller = Arc::new(PageController::new(backend.clone(), cache.clone()));
//! let resolver = RecordResolver::new(backend, cache);
//! spawn_staleness_watcher(controller.clone());
//!
//! // narrow, sort, page
//! controller
//!     .set_filter(
//!         "name",
//!         Some(FilterValue::text("A1")),
//!         registry.description_for("name").unwrap().clone(),
//!     )
//!     .await?;
//! controller.set_sort_by(vec![SortBy::descend("created")]).await?;
//! controller.list_page(2).await?;
//!
//! // map the page's ids to displayable records
//! let page = controller.snapshot();
//! let records = resolver.resolve(&page.items).await?;
//! ```

pub mod backend;
pub mod columns;
pub mod config;
pub mod controller;
pub mod core;
pub mod input;
pub mod registry;
pub mod resolver;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        DateBounds, FilterDescription, FilterKind, FilterOptions, FilterOptionsPatch, FilterSet,
        FilterSetting, FilterValue, ListQuery, ListResponse, MatchMode, MetadataPair, QueryParams,
        RangeBounds, SelectOption, SortBy, SortOrder, ordering, serialize_filters,
    };

    // === Errors ===
    pub use crate::core::{
        ConfigError, FilterError, ListwiseError, ListwiseResult, RequestError, ResolveError,
    };

    // === Service Traits ===
    pub use crate::core::{ListClient, Record, RecordFetcher};

    // === Columns & Registry ===
    pub use crate::columns::{BoundColumn, ColumnDef, ColumnFilter, bind_columns};
    pub use crate::registry::FilterRegistry;

    // === Config ===
    pub use crate::config::{FilterEntry, FiltersConfig, TableConfig};

    // === Controller & Resolver ===
    pub use crate::controller::{
        FetchPhase, Page, PageController, PagedItems, spawn_staleness_watcher,
    };
    pub use crate::resolver::{RecordCache, RecordResolver};

    // === Input ===
    pub use crate::input::{DEFAULT_DEBOUNCE, DebouncedInput};

    // === Backends ===
    #[cfg(feature = "http")]
    pub use crate::backend::HttpBackend;
    #[cfg(feature = "in-memory")]
    pub use crate::backend::InMemoryBackend;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::NaiveDate;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
