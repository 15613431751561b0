#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod postgrest;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    filter::{PackFilter, QueryDescriptor},
    inventory::{Id, ItemRecord, Movement, NamedRef, NewItem, ResultRow, Status},
};

/// Errors raised by the remote data service.
#[derive(Debug, Error)]
pub(crate) enum QueryError {
    #[error("failed to reach the data service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("data service returned {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("data service returned no {0}")]
    Missing(&'static str),
}

/// Paging and ordering applied when executing a descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ListOptions {
    pub(crate) limit: Option<usize>,
    pub(crate) order_by_recency_descending: bool,
}

impl ListOptions {
    pub(crate) fn recent(limit: Option<usize>) -> Self {
        Self {
            limit,
            order_by_recency_descending: true,
        }
    }
}

/// The remote backend holding items, locations, movements and photos.
///
/// Every call either succeeds completely or returns an error; none of them
/// touch caller state.
#[async_trait]
pub(crate) trait DataService: Send + Sync {
    /// Lists items matching every predicate of `descriptor`.
    async fn execute(
        &self,
        descriptor: &QueryDescriptor,
        options: ListOptions,
    ) -> Result<Vec<ItemRecord>, QueryError>;

    async fn item(&self, id: &str) -> Result<Option<ItemRecord>, QueryError>;

    /// Runs the `quick_pack_by_ids` procedure.
    async fn pack_by_ids(&self, ids: &[Id]) -> Result<Vec<ResultRow>, QueryError>;

    /// Runs the `quick_pack_filter` procedure.
    async fn pack_by_filters(&self, filter: &PackFilter) -> Result<Vec<ResultRow>, QueryError>;

    async fn set_status(&self, ids: &[Id], status: Status) -> Result<(), QueryError>;

    async fn record_movements(&self, movements: &[Movement]) -> Result<(), QueryError>;

    async fn insert_item(&self, item: &NewItem) -> Result<ItemRecord, QueryError>;

    /// Stores a photo under `path` and returns its public URL.
    async fn upload_photo(
        &self,
        path: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, QueryError>;

    async fn people(&self) -> Result<Vec<NamedRef>, QueryError>;

    async fn places(&self) -> Result<Vec<NamedRef>, QueryError>;

    async fn containers(&self, place_id: &str) -> Result<Vec<NamedRef>, QueryError>;

    async fn slots(&self, container_id: &str) -> Result<Vec<NamedRef>, QueryError>;
}
