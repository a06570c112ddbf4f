//! Movie metadata provider abstraction
//!
//! Search pages, detail pages and the comparison picker all go through this
//! trait, so the HTTP layer never talks to an upstream API directly.

use crate::{
    error::AppResult,
    models::{MovieDetail, SearchResults},
};

pub mod omdb;

pub use omdb::OmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Free-text search by title
    async fn search(&self, query: &str) -> AppResult<SearchResults>;

    /// Full record by IMDb identifier
    async fn movie_by_id(&self, imdb_id: &str) -> AppResult<MovieDetail>;

    /// Full record by exact title
    async fn movie_by_title(&self, title: &str) -> AppResult<MovieDetail>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
