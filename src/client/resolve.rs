//! Pre-navigation resolver: fetches the record a detail/update view needs
//! before the view activates.

use super::{ClientError, EntityService, RestEntity};

/// Outcome of resolving a route.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<E> {
    /// An existing record was fetched; the view opens in edit mode.
    Entity(E),
    /// No identifier in the route; the view opens with a blank draft.
    New,
}

/// Resolve an optional route identifier against the backend.
///
/// `Err(ClientError::NotFound)` means the caller must redirect to its
/// not-found route; the view never initializes in that case.
pub async fn resolve_entity<E: RestEntity>(
    service: &EntityService<E>,
    id: Option<i64>,
) -> Result<Resolved<E>, ClientError> {
    match id {
        Some(id) => service.find(id).await.map(Resolved::Entity),
        None => Ok(Resolved::New),
    }
}
