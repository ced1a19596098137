//! Kanban Backend and Client
//!
//! A REST backend with SQLite persistence for three related record types
//! (boards, lines, cards), plus the typed client used to drive list and
//! create/edit views against it.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod query;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Boards
        .route("/boards", get(api::list_boards).post(api::create_board))
        .route(
            "/boards/{id}",
            get(api::get_board)
                .put(api::update_board)
                .patch(api::partial_update_board)
                .delete(api::delete_board),
        )
        // Lines
        .route("/lines", get(api::list_lines).post(api::create_line))
        .route(
            "/lines/{id}",
            get(api::get_line)
                .put(api::update_line)
                .patch(api::partial_update_line)
                .delete(api::delete_line),
        )
        // Cards
        .route("/cards", get(api::list_cards).post(api::create_card))
        .route(
            "/cards/{id}",
            get(api::get_card)
                .put(api::update_card)
                .patch(api::partial_update_card)
                .delete(api::delete_card),
        );

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
