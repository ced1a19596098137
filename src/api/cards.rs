//! Card API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use super::{validate_update_id, TOTAL_COUNT_HEADER};
use crate::errors::AppError;
use crate::models::{Card, CardPayload};
use crate::query::{CardCriteria, PageRequest, CARD_SORTABLE};
use crate::AppState;

/// GET /api/cards - List cards matching the criteria, one page at a time.
pub async fn list_cards(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("REST request to get Cards by criteria: {:?}", params);

    let criteria = CardCriteria::from_params(&params)?;
    let page = PageRequest::from_params(&params, CARD_SORTABLE)?;
    let (cards, total) = state.repo.query_cards(&criteria, &page).await?;

    Ok((
        AppendHeaders([(TOTAL_COUNT_HEADER, total.to_string())]),
        Json(cards),
    ))
}

/// GET /api/cards/:id - Get a single card.
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Card>, AppError> {
    tracing::debug!("REST request to get Card : {}", id);

    match state.repo.find_card(id).await? {
        Some(card) => Ok(Json(card)),
        None => Err(AppError::NotFound(format!("Card {} not found", id))),
    }
}

/// POST /api/cards - Create a new card.
pub async fn create_card(
    State(state): State<AppState>,
    Json(payload): Json<CardPayload>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("REST request to save Card : {:?}", payload);

    if payload.id.is_some() {
        return Err(AppError::Validation(
            "A new card cannot already have an ID".to_string(),
        ));
    }

    let card = state.repo.create_card(&payload).await?;
    let location = format!("/api/cards/{}", card.id);
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::LOCATION, location)]),
        Json(card),
    ))
}

/// PUT /api/cards/:id - Full update of an existing card.
pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CardPayload>,
) -> Result<Json<Card>, AppError> {
    tracing::debug!("REST request to update Card : {}, {:?}", id, payload);

    validate_update_id(id, payload.id, "card")?;
    let card = state.repo.update_card(id, &payload).await?;
    Ok(Json(card))
}

/// PATCH /api/cards/:id - Partial update; absent fields are left untouched.
pub async fn partial_update_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CardPayload>,
) -> Result<Json<Card>, AppError> {
    tracing::debug!("REST request to partial update Card : {}, {:?}", id, payload);

    validate_update_id(id, payload.id, "card")?;
    let card = state.repo.partial_update_card(id, &payload).await?;
    Ok(Json(card))
}

/// DELETE /api/cards/:id - Delete a card. Idempotent; 204 either way.
pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::debug!("REST request to delete Card : {}", id);

    state.repo.delete_card(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
