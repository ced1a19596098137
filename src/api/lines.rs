//! Line API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use super::{validate_update_id, TOTAL_COUNT_HEADER};
use crate::errors::AppError;
use crate::models::{Line, LinePayload};
use crate::query::{LineCriteria, PageRequest, LINE_SORTABLE};
use crate::AppState;

/// GET /api/lines - List lines matching the criteria, one page at a time.
pub async fn list_lines(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("REST request to get Lines by criteria: {:?}", params);

    let criteria = LineCriteria::from_params(&params)?;
    let page = PageRequest::from_params(&params, LINE_SORTABLE)?;
    let (lines, total) = state.repo.query_lines(&criteria, &page).await?;

    Ok((
        AppendHeaders([(TOTAL_COUNT_HEADER, total.to_string())]),
        Json(lines),
    ))
}

/// GET /api/lines/:id - Get a single line.
pub async fn get_line(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Line>, AppError> {
    tracing::debug!("REST request to get Line : {}", id);

    match state.repo.find_line(id).await? {
        Some(line) => Ok(Json(line)),
        None => Err(AppError::NotFound(format!("Line {} not found", id))),
    }
}

/// POST /api/lines - Create a new line.
pub async fn create_line(
    State(state): State<AppState>,
    Json(payload): Json<LinePayload>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("REST request to save Line : {:?}", payload);

    if payload.id.is_some() {
        return Err(AppError::Validation(
            "A new line cannot already have an ID".to_string(),
        ));
    }

    let line = state.repo.create_line(&payload).await?;
    let location = format!("/api/lines/{}", line.id);
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::LOCATION, location)]),
        Json(line),
    ))
}

/// PUT /api/lines/:id - Full update of an existing line.
pub async fn update_line(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LinePayload>,
) -> Result<Json<Line>, AppError> {
    tracing::debug!("REST request to update Line : {}, {:?}", id, payload);

    validate_update_id(id, payload.id, "line")?;
    let line = state.repo.update_line(id, &payload).await?;
    Ok(Json(line))
}

/// PATCH /api/lines/:id - Partial update; absent fields are left untouched.
pub async fn partial_update_line(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LinePayload>,
) -> Result<Json<Line>, AppError> {
    tracing::debug!("REST request to partial update Line : {}, {:?}", id, payload);

    validate_update_id(id, payload.id, "line")?;
    let line = state.repo.partial_update_line(id, &payload).await?;
    Ok(Json(line))
}

/// DELETE /api/lines/:id - Delete a line. Idempotent; 204 either way.
pub async fn delete_line(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::debug!("REST request to delete Line : {}", id);

    state.repo.delete_line(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
