use crate::db::{DocumentStore, Filter};
use crate::error::ApiError;
use crate::models::{Entity, Record};

pub mod diagnostics;
pub mod matches;
pub mod players;
pub mod root;
pub mod stats;

/// Fetches the documents of `T`'s collection and reshapes them for clients.
pub(crate) async fn list_records<T: Entity>(
    store: &DocumentStore,
    filter: &Filter,
) -> Result<Vec<Record<T>>, ApiError> {
    let docs = store.query(T::COLLECTION, filter).await?;
    docs.into_iter()
        .map(|doc| Record::from_document(doc).map_err(|e| ApiError::Store(e.into())))
        .collect()
}
