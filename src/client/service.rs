//! Entity services: the five REST calls per entity type.

use std::marker::PhantomData;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ErrorResponse;
use crate::models::{
    Board, BoardPayload, Card, CardPayload, Identified, Line, LinePayload, NewBoard, NewCard,
    NewLine,
};

use super::{merge_missing, ClientError};

/// Wiring of an entity type to its REST resource.
pub trait RestEntity: Identified + Serialize + DeserializeOwned {
    /// Resource collection name under `/api`.
    const RESOURCE: &'static str;
    /// Draft type sent to create.
    type Draft: Serialize;
    /// Patch type sent to partial update; must carry the identifier.
    type Patch: Serialize + Identified;
}

impl RestEntity for Board {
    const RESOURCE: &'static str = "boards";
    type Draft = NewBoard;
    type Patch = BoardPayload;
}

impl RestEntity for Line {
    const RESOURCE: &'static str = "lines";
    type Draft = NewLine;
    type Patch = LinePayload;
}

impl RestEntity for Card {
    const RESOURCE: &'static str = "cards";
    type Draft = NewCard;
    type Patch = CardPayload;
}

/// Wire-level list query: 0-based page, page size, `"field,ASC|DESC"` sort
/// strings and `<field>.<op>` filter pairs.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Vec<String>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size".to_string(), size.to_string()));
        }
        for sort in &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        params.extend(self.filters.iter().cloned());
        params
    }
}

/// One page of entities plus the total count reported by the backend.
#[derive(Debug, Clone)]
pub struct EntityPage<E> {
    pub items: Vec<E>,
    pub total_count: i64,
}

/// REST service for one entity type.
///
/// Stateless beyond the HTTP client; every call goes to the backend and no
/// local cache is mutated.
#[derive(Debug, Clone)]
pub struct EntityService<E> {
    http: reqwest::Client,
    resource_url: String,
    _entity: PhantomData<E>,
}

impl<E: RestEntity> EntityService<E> {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            resource_url: format!("{}/api/{}", base_url.trim_end_matches('/'), E::RESOURCE),
            _entity: PhantomData,
        }
    }

    /// Fetch one record by identifier. Absence of a body maps to
    /// [`ClientError::NotFound`], which callers treat as a navigate-away
    /// condition rather than a fault.
    pub async fn find(&self, id: i64) -> Result<E, ClientError> {
        let response = self
            .http
            .get(format!("{}/{}", self.resource_url, id))
            .send()
            .await?;
        Ok(ok_response(response).await?.json::<E>().await?)
    }

    /// Fetch a page of records matching the query.
    pub async fn query(&self, query: &ListQuery) -> Result<EntityPage<E>, ClientError> {
        let response = self
            .http
            .get(&self.resource_url)
            .query(&query.to_params())
            .send()
            .await?;
        let response = ok_response(response).await?;

        let total_count = response
            .headers()
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let items: Vec<E> = response.json().await?;
        let total_count = total_count.unwrap_or(items.len() as i64);

        Ok(EntityPage { items, total_count })
    }

    /// Persist a draft. The backend assigns the identifier.
    pub async fn create(&self, draft: &E::Draft) -> Result<E, ClientError> {
        let response = self
            .http
            .post(&self.resource_url)
            .json(draft)
            .send()
            .await?;
        Ok(ok_response(response).await?.json::<E>().await?)
    }

    /// Full replace of a persisted entity.
    pub async fn update(&self, entity: &E) -> Result<E, ClientError> {
        let id = entity.identifier().ok_or(ClientError::MissingIdentifier)?;
        let response = self
            .http
            .put(format!("{}/{}", self.resource_url, id))
            .json(entity)
            .send()
            .await?;
        Ok(ok_response(response).await?.json::<E>().await?)
    }

    /// Merge only the provided fields into the persisted record.
    pub async fn partial_update(&self, patch: &E::Patch) -> Result<E, ClientError> {
        let id = patch.identifier().ok_or(ClientError::MissingIdentifier)?;
        let response = self
            .http
            .patch(format!("{}/{}", self.resource_url, id))
            .json(patch)
            .send()
            .await?;
        Ok(ok_response(response).await?.json::<E>().await?)
    }

    /// Remove the record. No body is expected.
    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.resource_url, id))
            .send()
            .await?;
        ok_response(response).await?;
        Ok(())
    }

    /// Per-entity convenience for the picker merge; see
    /// [`merge_missing`](super::merge_missing).
    pub fn merge_missing<I>(&self, collection: Vec<E>, candidates: I) -> Vec<E>
    where
        I: IntoIterator<Item = Option<E>>,
    {
        merge_missing(collection, candidates)
    }
}

/// Map non-success responses to [`ClientError`], extracting the backend's
/// error message when it sent one.
async fn ok_response(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|e| e.message)
        .unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
