use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{MovieDetail, MovieSummary, SearchResults};
use crate::services::{ComparisonReport, ComparisonSlotStore, FavoritesStore, Slot, SlotPair};

use super::state::write_blocking;
use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    /// Keep only the first `limit` results
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ComparisonRequest {
    pub imdb_id: String,
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub movie: MovieDetail,
    /// False when the poster is the "N/A" sentinel
    pub has_poster: bool,
    pub favorite: bool,
    pub in_comparison: bool,
    pub comparison_count: usize,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<MovieSummary>,
    pub count: usize,
}

impl From<&FavoritesStore> for FavoritesResponse {
    fn from(store: &FavoritesStore) -> Self {
        Self {
            favorites: store.favorites().to_vec(),
            count: store.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub imdb_id: String,
    pub favorite: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub slots: SlotPair,
    pub count: usize,
    /// Present once both slots are occupied
    pub report: Option<ComparisonReport>,
}

impl From<&ComparisonSlotStore> for ComparisonResponse {
    fn from(store: &ComparisonSlotStore) -> Self {
        Self {
            slots: store.slots().clone(),
            count: store.count(),
            report: store
                .pair()
                .map(|(first, second)| ComparisonReport::between(first, second)),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Search titles by free text
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResults>> {
    let mut results = state.provider.search(&params.q).await?;
    if let Some(limit) = params.limit {
        results.movies.truncate(limit);
    }
    Ok(Json(results))
}

/// Full record plus its favorite and comparison status
pub async fn get_movie(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<MovieResponse>> {
    let movie = state.provider.movie_by_id(&imdb_id).await?;
    Ok(Json(movie_response(&state, movie).await))
}

/// Same as [`get_movie`], looked up by exact title
pub async fn get_movie_by_title(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> AppResult<Json<MovieResponse>> {
    let movie = state.provider.movie_by_title(&params.title).await?;
    Ok(Json(movie_response(&state, movie).await))
}

async fn movie_response(state: &AppState, movie: MovieDetail) -> MovieResponse {
    let favorite = state.favorites.read().await.is_favorite(&movie.id);
    let comparison = state.comparison.read().await;

    MovieResponse {
        has_poster: movie.has_poster(),
        favorite,
        in_comparison: comparison.is_in_comparison(&movie.id),
        comparison_count: comparison.count(),
        movie,
    }
}

/// List favorites
pub async fn get_favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let favorites = state.favorites.read().await;
    Json(FavoritesResponse::from(&*favorites))
}

/// Add a favorite; already-favorited ids are left as they are
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(movie): Json<MovieSummary>,
) -> AppResult<(StatusCode, Json<FavoriteStatus>)> {
    let imdb_id = movie.id.clone();
    let count = write_blocking(&state.favorites, move |favorites| {
        favorites.add(movie);
        favorites.len()
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(FavoriteStatus {
            imdb_id,
            favorite: true,
            count,
        }),
    ))
}

/// Flip a movie's favorite status
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Json(movie): Json<MovieSummary>,
) -> AppResult<Json<FavoriteStatus>> {
    Ok(Json(toggle(&state, movie).await?))
}

/// Fetch a movie and flip its favorite status from the full record
pub async fn toggle_movie_favorite(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<FavoriteStatus>> {
    let movie = state.provider.movie_by_id(&imdb_id).await?;
    Ok(Json(toggle(&state, MovieSummary::from(&movie)).await?))
}

async fn toggle(state: &AppState, movie: MovieSummary) -> AppResult<FavoriteStatus> {
    let imdb_id = movie.id.clone();
    let (favorite, count) = write_blocking(&state.favorites, move |favorites| {
        let favorite = favorites.toggle(movie);
        (favorite, favorites.len())
    })
    .await?;

    Ok(FavoriteStatus {
        imdb_id,
        favorite,
        count,
    })
}

/// Remove a favorite; unknown ids are not an error
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<FavoriteStatus>> {
    let id = imdb_id.clone();
    let count = write_blocking(&state.favorites, move |favorites| {
        favorites.remove(&id);
        favorites.len()
    })
    .await?;

    Ok(Json(FavoriteStatus {
        imdb_id,
        favorite: false,
        count,
    }))
}

/// Current slots and, when both are filled, the derived metrics
pub async fn get_comparison(State(state): State<AppState>) -> Json<ComparisonResponse> {
    let comparison = state.comparison.read().await;
    Json(ComparisonResponse::from(&*comparison))
}

/// Fetch a movie and place it in the first open slot
pub async fn add_to_comparison(
    State(state): State<AppState>,
    Json(request): Json<ComparisonRequest>,
) -> AppResult<Json<ComparisonResponse>> {
    // The lock is taken only after the fetch resolves; a dropped request never reaches it.
    let movie = state.provider.movie_by_id(&request.imdb_id).await?;

    let response = write_blocking(&state.comparison, move |comparison| {
        comparison.add_to_first_open_slot(movie);
        ComparisonResponse::from(&*comparison)
    })
    .await?;
    Ok(Json(response))
}

/// Fetch a movie and place it in an explicit slot
pub async fn put_slot(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<ComparisonRequest>,
) -> AppResult<Json<ComparisonResponse>> {
    let slot = Slot::try_from(index)?;
    let movie = state.provider.movie_by_id(&request.imdb_id).await?;

    let response = write_blocking(&state.comparison, move |comparison| {
        comparison.add_to_slot(movie, slot);
        ComparisonResponse::from(&*comparison)
    })
    .await?;
    Ok(Json(response))
}

/// Empty one slot
pub async fn clear_slot(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> AppResult<Json<ComparisonResponse>> {
    let slot = Slot::try_from(index)?;

    let response = write_blocking(&state.comparison, move |comparison| {
        comparison.clear_slot(slot);
        ComparisonResponse::from(&*comparison)
    })
    .await?;
    Ok(Json(response))
}

/// Empty both slots
pub async fn clear_comparison(
    State(state): State<AppState>,
) -> AppResult<Json<ComparisonResponse>> {
    let response = write_blocking(&state.comparison, |comparison| {
        comparison.clear_all();
        ComparisonResponse::from(&*comparison)
    })
    .await?;
    Ok(Json(response))
}
