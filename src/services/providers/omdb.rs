//! OMDb API provider
//!
//! A single GET endpoint selects the lookup by parameter:
//! 1. `s=` free-text search → `{Search, totalResults, Response}`
//! 2. `i=` IMDb ID → full record
//! 3. `t=` exact title → full record
//!
//! Every response carries `Response: "True"|"False"`; failures add `Error`.

use crate::{
    error::{AppError, AppResult},
    models::{ApiEnvelope, ApiSearchResponse, MovieDetail, MovieSummary, SearchResults},
    services::providers::MovieProvider,
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("OMDb API key is empty; upstream requests will be rejected");
        }

        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// Issues the GET and returns the body once the envelope reports success
    async fn fetch(&self, param: &str, value: &str) -> AppResult<serde_json::Value> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("apikey", self.api_key.as_str()), (param, value)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw OMDb API response");

        parse_envelope(&response_text)
    }
}

fn parse_envelope(response_text: &str) -> AppResult<serde_json::Value> {
    let body: serde_json::Value = serde_json::from_str(response_text).map_err(|e| {
        tracing::error!(error = %e, response = %response_text, "Failed to parse OMDb response");
        AppError::ExternalApi(format!("Failed to parse OMDb response: {}", e))
    })?;

    let envelope: ApiEnvelope = serde_json::from_value(body.clone())
        .map_err(|e| AppError::ExternalApi(format!("Invalid OMDb response format: {}", e)))?;

    if envelope.is_success() {
        Ok(body)
    } else {
        Err(AppError::NotFound(envelope.error_message()))
    }
}

fn parse_search(body: serde_json::Value) -> AppResult<SearchResults> {
    let raw: ApiSearchResponse = serde_json::from_value(body)
        .map_err(|e| AppError::ExternalApi(format!("Invalid OMDb search format: {}", e)))?;

    let movies: Vec<MovieSummary> = raw
        .search
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<MovieSummary>(item) {
            Ok(movie) => Some(movie),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unrecognized search result");
                None
            }
        })
        .collect();

    let total_results = raw
        .total_results
        .and_then(|total| total.trim().parse().ok())
        .unwrap_or(movies.len() as u32);

    Ok(SearchResults {
        movies,
        total_results,
    })
}

fn parse_detail(body: serde_json::Value) -> AppResult<MovieDetail> {
    serde_json::from_value(body).map_err(|e| {
        tracing::error!(error = %e, "Failed to deserialize OMDb movie record");
        AppError::ExternalApi(format!("Failed to parse OMDb movie record: {}", e))
    })
}

fn require_non_blank<'a>(value: &'a str, what: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(trimmed)
}

#[async_trait::async_trait]
impl MovieProvider for OmdbProvider {
    async fn search(&self, query: &str) -> AppResult<SearchResults> {
        let query = require_non_blank(query, "Search query")?;
        let results = parse_search(self.fetch("s", query).await?)?;

        tracing::info!(
            query = %query,
            results = results.movies.len(),
            total = results.total_results,
            provider = self.name(),
            "Movie search completed"
        );

        Ok(results)
    }

    async fn movie_by_id(&self, imdb_id: &str) -> AppResult<MovieDetail> {
        let imdb_id = require_non_blank(imdb_id, "IMDb ID")?;
        let movie = parse_detail(self.fetch("i", imdb_id).await?)?;
        tracing::info!(id = %movie.id, provider = self.name(), "Fetched movie details");
        Ok(movie)
    }

    async fn movie_by_title(&self, title: &str) -> AppResult<MovieDetail> {
        let title = require_non_blank(title, "Title")?;
        let movie = parse_detail(self.fetch("t", title).await?)?;
        tracing::info!(id = %movie.id, provider = self.name(), "Fetched movie by title");
        Ok(movie)
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieKind;

    #[test]
    fn test_envelope_false_is_not_found() {
        let err = parse_envelope(r#"{"Response":"False","Error":"Movie not found!"}"#).unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Movie not found!"));
    }

    #[test]
    fn test_envelope_not_json_is_external_error() {
        let err = parse_envelope("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[test]
    fn test_envelope_missing_response_is_external_error() {
        let err = parse_envelope(r#"{"Title":"Inception"}"#).unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[test]
    fn test_parse_search_skips_unknown_kinds() {
        let body = serde_json::json!({
            "Search": [
                {"Title":"Inception","Year":"2010","imdbID":"tt1375666","Type":"movie","Poster":"N/A"},
                {"Title":"Inception: The Game","Year":"2010","imdbID":"tt9","Type":"game","Poster":"N/A"},
                {"Title":"Inception: Jobs","Year":"2010","imdbID":"tt5295894","Type":"episode","Poster":"N/A"}
            ],
            "totalResults": "3",
            "Response": "True"
        });

        let results = parse_search(body).unwrap();
        assert_eq!(results.movies.len(), 2);
        assert_eq!(results.movies[1].kind, MovieKind::Episode);
        assert_eq!(results.total_results, 3);
    }

    #[test]
    fn test_parse_search_missing_total_uses_page_size() {
        let body = serde_json::json!({
            "Search": [
                {"Title":"Inception","Year":"2010","imdbID":"tt1375666","Type":"movie","Poster":"N/A"}
            ],
            "Response": "True"
        });
        assert_eq!(parse_search(body).unwrap().total_results, 1);
    }

    #[test]
    fn test_parse_detail_rejects_partial_record() {
        let body = serde_json::json!({"Title": "Inception", "Response": "True"});
        assert!(matches!(parse_detail(body), Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected_without_request() {
        let provider = OmdbProvider::new("key".to_string(), "http://127.0.0.1:9/".to_string());
        let err = provider.search("   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected_without_request() {
        let provider = OmdbProvider::new("key".to_string(), "http://127.0.0.1:9/".to_string());
        let err = provider.movie_by_id("").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
