use grocer_db::DbError;
use grocer_openfood::OpenFoodError;
use thiserror::Error;
use uuid::Uuid;

/// A candidate source could not answer. The aggregator absorbs these; they
/// only surface through logs.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("local catalog error: {0}")]
    Local(#[from] DbError),

    #[error("external catalog error: {0}")]
    External(#[from] OpenFoodError),

    #[error("{source_name} source timed out after {after_ms} ms")]
    Timeout {
        source_name: &'static str,
        after_ms: u64,
    },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the item store or permission backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("item {0} changed since it was read")]
    Stale(Uuid),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Why a suggestion or conversion request was refused.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("item {0} not found")]
    ItemNotFound(Uuid),

    #[error("shopping list {0} not found")]
    ListNotFound(Uuid),

    #[error("product {0} not found")]
    ProductNotFound(Uuid),

    #[error("user {user_id} may not modify list {list_id}")]
    Unauthorized { user_id: Uuid, list_id: Uuid },

    #[error("item {0} is already bound to a product")]
    AlreadyResolved(Uuid),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
