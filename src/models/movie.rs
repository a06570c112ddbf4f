use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Value the upstream API uses for any field it has no data for
pub const NOT_AVAILABLE: &str = "N/A";

/// Category of a title
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MovieKind {
    Movie,
    Series,
    Episode,
}

impl Display for MovieKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieKind::Movie => write!(f, "movie"),
            MovieKind::Series => write!(f, "series"),
            MovieKind::Episode => write!(f, "episode"),
        }
    }
}

/// One title as returned by a search and stored in favorites
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    /// IMDb identifier (e.g., "tt1375666"), the sole equality key
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// Free-form, may be a range such as "2010–2015"
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Poster")]
    pub poster_url: String,
    #[serde(rename = "Type")]
    pub kind: MovieKind,
}

/// Score from a secondary ranking source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rating {
    /// Name like "Rotten Tomatoes"
    #[serde(rename = "Source")]
    pub source: String,
    /// Rating like "87%" or "8.8/10"
    #[serde(rename = "Value")]
    pub value: String,
}

/// Full record returned by an identifier or exact-title lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Poster")]
    pub poster_url: String,
    #[serde(rename = "Type")]
    pub kind: MovieKind,
    /// Classification like "PG-13"
    #[serde(rename = "Rated")]
    pub rated: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    /// Like "148 min"
    #[serde(rename = "Runtime")]
    pub runtime: String,
    /// Comma-separated, e.g. "Action, Sci-Fi"
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Director")]
    pub director: String,
    #[serde(rename = "Writer")]
    pub writer: String,
    #[serde(rename = "Actors")]
    pub actors: String,
    #[serde(rename = "Plot")]
    pub plot: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Awards")]
    pub awards: String,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<Rating>,
    #[serde(rename = "Metascore", default)]
    pub metascore: String,
    /// Numeric-as-string, "N/A" when unrated
    #[serde(rename = "imdbRating")]
    pub imdb_rating: String,
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: String,
    #[serde(rename = "DVD", default)]
    pub dvd: String,
    #[serde(rename = "BoxOffice", default)]
    pub box_office: String,
    #[serde(rename = "Production", default)]
    pub production: String,
    #[serde(rename = "Website", default)]
    pub website: String,
}

impl MovieDetail {
    /// Whether the poster URL points at an actual image
    pub fn has_poster(&self) -> bool {
        !self.poster_url.is_empty() && self.poster_url != NOT_AVAILABLE
    }

    /// Genre tokens in listed order, split on `", "` exactly as upstream joins them
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genre.split(", ")
    }
}

impl From<&MovieDetail> for MovieSummary {
    fn from(detail: &MovieDetail) -> Self {
        MovieSummary {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            kind: detail.kind,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn summary(id: &str, title: &str) -> MovieSummary {
        MovieSummary {
            id: id.to_string(),
            title: title.to_string(),
            year: "2010".to_string(),
            poster_url: NOT_AVAILABLE.to_string(),
            kind: MovieKind::Movie,
        }
    }

    pub fn detail(id: &str, title: &str) -> MovieDetail {
        MovieDetail {
            id: id.to_string(),
            title: title.to_string(),
            year: "2010".to_string(),
            poster_url: NOT_AVAILABLE.to_string(),
            kind: MovieKind::Movie,
            rated: "PG-13".to_string(),
            released: "16 Jul 2010".to_string(),
            runtime: "148 min".to_string(),
            genre: "Action, Adventure, Sci-Fi".to_string(),
            director: "Christopher Nolan".to_string(),
            writer: "Christopher Nolan".to_string(),
            actors: "Leonardo DiCaprio, Joseph Gordon-Levitt".to_string(),
            plot: "A thief who steals corporate secrets".to_string(),
            language: "English".to_string(),
            country: "United States".to_string(),
            awards: "Won 4 Oscars".to_string(),
            ratings: vec![Rating {
                source: "Internet Movie Database".to_string(),
                value: "8.8/10".to_string(),
            }],
            metascore: "74".to_string(),
            imdb_rating: "8.8".to_string(),
            imdb_votes: "2,500,000".to_string(),
            dvd: "N/A".to_string(),
            box_office: "$292,587,330".to_string(),
            production: "N/A".to_string(),
            website: "N/A".to_string(),
        }
    }
}
