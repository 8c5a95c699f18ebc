//! Core module containing the filter model, serializer and service traits

pub mod error;
pub mod filter;
pub mod query;
pub mod record;
pub mod sort;

pub use error::{
    ConfigError, FilterError, ListwiseError, ListwiseResult, RequestError, ResolveError,
};
pub use filter::{
    DateBounds, FilterDescription, FilterKind, FilterOptions, FilterOptionsPatch, FilterSet,
    FilterSetting, FilterValue, MatchMode, MetadataPair, RangeBounds, SelectOption,
};
pub use query::{DEFAULT_PAGE_SIZE, ListQuery, ListResponse, QueryParams, serialize_filters};
pub use record::{ListClient, Record, RecordFetcher};
pub use sort::{SortBy, SortOrder, ordering};
