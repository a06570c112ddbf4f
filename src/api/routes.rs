use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::error::AppError;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Search and detail
        .route("/search", get(handlers::search))
        .route("/movies", get(handlers::get_movie_by_title))
        .route("/movies/:imdb_id", get(handlers::get_movie))
        .route("/movies/:imdb_id/favorite", post(handlers::toggle_movie_favorite))
        // Favorites
        .route("/favorites", get(handlers::get_favorites))
        .route("/favorites", post(handlers::add_favorite))
        .route("/favorites/toggle", post(handlers::toggle_favorite))
        .route("/favorites/:imdb_id", delete(handlers::remove_favorite))
        // Comparison
        .route("/comparison", get(handlers::get_comparison))
        .route("/comparison", post(handlers::add_to_comparison))
        .route("/comparison", delete(handlers::clear_comparison))
        .route("/comparison/:slot", put(handlers::put_slot))
        .route("/comparison/:slot", delete(handlers::clear_slot))
}

/// Turns a handler panic into a retryable 500; store state is untouched
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");
    AppError::Internal("Something went wrong. Please try again.".to_string()).into_response()
}
