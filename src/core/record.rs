//! Service traits for records and the remote list endpoint
//!
//! The crate is agnostic to what a record is and where it lives; these
//! traits are the only seams it needs.

use crate::core::query::{ListQuery, ListResponse};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// A displayable record with a stable identity
pub trait Record: Clone + Send + Sync + 'static {
    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;
}

/// Client side of the list endpoint contract.
///
/// The request is the flat parameter map produced by
/// [`ListQuery::to_params`]; the response is `{count, results}`. No other
/// endpoint shape is supported.
#[async_trait]
pub trait ListClient<T: Record>: Send + Sync {
    /// Fetch one page of the filtered, sorted collection
    async fn list(&self, query: &ListQuery) -> Result<ListResponse<T>>;
}

/// Bulk by-id lookup used by the record resolver
#[async_trait]
pub trait RecordFetcher<T: Record>: Send + Sync {
    /// Fetch the given records.
    ///
    /// Unknown ids are omitted from the result rather than failing the
    /// whole batch.
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>>;
}
