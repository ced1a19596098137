//! Board API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use super::{validate_update_id, TOTAL_COUNT_HEADER};
use crate::errors::AppError;
use crate::models::{Board, BoardPayload};
use crate::query::{BoardCriteria, PageRequest, BOARD_SORTABLE};
use crate::AppState;

/// GET /api/boards - List boards matching the criteria, one page at a time.
pub async fn list_boards(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("REST request to get Boards by criteria: {:?}", params);

    let criteria = BoardCriteria::from_params(&params)?;
    let page = PageRequest::from_params(&params, BOARD_SORTABLE)?;
    let (boards, total) = state.repo.query_boards(&criteria, &page).await?;

    Ok((
        AppendHeaders([(TOTAL_COUNT_HEADER, total.to_string())]),
        Json(boards),
    ))
}

/// GET /api/boards/:id - Get a single board.
pub async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Board>, AppError> {
    tracing::debug!("REST request to get Board : {}", id);

    match state.repo.find_board(id).await? {
        Some(board) => Ok(Json(board)),
        None => Err(AppError::NotFound(format!("Board {} not found", id))),
    }
}

/// POST /api/boards - Create a new board.
pub async fn create_board(
    State(state): State<AppState>,
    Json(payload): Json<BoardPayload>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("REST request to save Board : {:?}", payload);

    if payload.id.is_some() {
        return Err(AppError::Validation(
            "A new board cannot already have an ID".to_string(),
        ));
    }

    let board = state.repo.create_board(&payload).await?;
    let location = format!("/api/boards/{}", board.id);
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::LOCATION, location)]),
        Json(board),
    ))
}

/// PUT /api/boards/:id - Full update of an existing board.
pub async fn update_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BoardPayload>,
) -> Result<Json<Board>, AppError> {
    tracing::debug!("REST request to update Board : {}, {:?}", id, payload);

    validate_update_id(id, payload.id, "board")?;
    let board = state.repo.update_board(id, &payload).await?;
    Ok(Json(board))
}

/// PATCH /api/boards/:id - Partial update; absent fields are left untouched.
pub async fn partial_update_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BoardPayload>,
) -> Result<Json<Board>, AppError> {
    tracing::debug!("REST request to partial update Board : {}, {:?}", id, payload);

    validate_update_id(id, payload.id, "board")?;
    let board = state.repo.partial_update_board(id, &payload).await?;
    Ok(Json(board))
}

/// DELETE /api/boards/:id - Delete a board. Idempotent; 204 either way.
pub async fn delete_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::debug!("REST request to delete Board : {}", id);

    state.repo.delete_board(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
