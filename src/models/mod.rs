use serde::{Deserialize, Serialize};

pub mod movie;

pub use movie::{MovieDetail, MovieKind, MovieSummary, Rating, NOT_AVAILABLE};

#[cfg(test)]
pub(crate) use movie::fixtures;

/// Search results handed to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub movies: Vec<MovieSummary>,
    /// Total matches upstream, which may exceed `movies.len()`
    pub total_results: u32,
}

// ============================================================================
// OMDb API Types
// ============================================================================

/// Discriminator present on every OMDb response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl ApiEnvelope {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// Upstream error message, or a generic one when none was sent
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Movie not found!".to_string())
    }
}

/// Raw OMDb search response, items kept loose so one bad record doesn't sink the page
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<serde_json::Value>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
}
