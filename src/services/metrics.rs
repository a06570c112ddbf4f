//! Derived comparison metrics over two movie records.
//!
//! Everything here is a pure function of its inputs; nothing is persisted.

use serde::Serialize;
use std::cmp::Ordering;

use crate::models::MovieDetail;

/// Parses the leading floating-point number of `text`
///
/// Leading whitespace is skipped and trailing garbage ignored ("8.8/10" is
/// 8.8). Text with no numeric prefix, like "N/A", yields NaN.
pub fn parse_leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return f64::NAN;
    }

    // Optional exponent, only taken when it has digits
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

/// Parses the leading integer of `text`, e.g. 2010 from "2010–2015"
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    text[..end].parse().ok()
}

/// Which side has the higher IMDb rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingVerdict {
    FirstHigher,
    SecondHigher,
    Tied,
}

/// Compares IMDb ratings numerically
///
/// Equal ratings are tied, and so is any pair where either side isn't a
/// number ("N/A" against "N/A" included).
pub fn compare_ratings(first: &MovieDetail, second: &MovieDetail) -> RatingVerdict {
    let a = parse_leading_float(&first.imdb_rating);
    let b = parse_leading_float(&second.imdb_rating);

    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => RatingVerdict::FirstHigher,
        Some(Ordering::Less) => RatingVerdict::SecondHigher,
        Some(Ordering::Equal) | None => RatingVerdict::Tied,
    }
}

/// Distance between two release years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "years")]
pub enum YearGap {
    Apart(u64),
    SameYear,
}

/// Absolute difference between the leading years
///
/// A year without a numeric prefix on either side reports `SameYear`.
pub fn year_gap(first: &MovieDetail, second: &MovieDetail) -> YearGap {
    match (parse_leading_int(&first.year), parse_leading_int(&second.year)) {
        (Some(a), Some(b)) if a != b => YearGap::Apart(a.abs_diff(b)),
        _ => YearGap::SameYear,
    }
}

/// Genres listed by both movies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreOverlap {
    /// In the order the first movie lists them
    pub shared: Vec<String>,
}

impl GenreOverlap {
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }
}

pub fn genre_overlap(first: &MovieDetail, second: &MovieDetail) -> GenreOverlap {
    let theirs: Vec<&str> = second.genres().collect();
    let mut shared: Vec<String> = Vec::new();

    for genre in first.genres() {
        if theirs.contains(&genre) && !shared.iter().any(|g| g == genre) {
            shared.push(genre.to_string());
        }
    }

    GenreOverlap { shared }
}

/// Coarse quality band for a single IMDb rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingBand {
    /// 8 and above
    High,
    /// 6 up to 8
    Mid,
    /// Below 6, or unrated
    Low,
}

pub fn rating_band(imdb_rating: &str) -> RatingBand {
    let rating = parse_leading_float(imdb_rating);
    if rating >= 8.0 {
        RatingBand::High
    } else if rating >= 6.0 {
        RatingBand::Mid
    } else {
        RatingBand::Low
    }
}

/// All derived metrics for an occupied pair of slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub rating: RatingVerdict,
    pub rating_bands: [RatingBand; 2],
    pub year_gap: YearGap,
    pub genre_overlap: GenreOverlap,
    pub shared_genre_count: usize,
}

impl ComparisonReport {
    pub fn between(first: &MovieDetail, second: &MovieDetail) -> Self {
        let genre_overlap = genre_overlap(first, second);
        Self {
            rating: compare_ratings(first, second),
            rating_bands: [
                rating_band(&first.imdb_rating),
                rating_band(&second.imdb_rating),
            ],
            year_gap: year_gap(first, second),
            shared_genre_count: genre_overlap.len(),
            genre_overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::detail;

    fn rated(rating: &str) -> MovieDetail {
        let mut movie = detail("tt1", "Rated");
        movie.imdb_rating = rating.to_string();
        movie
    }

    fn released(year: &str) -> MovieDetail {
        let mut movie = detail("tt1", "Released");
        movie.year = year.to_string();
        movie
    }

    fn genred(genre: &str) -> MovieDetail {
        let mut movie = detail("tt1", "Genred");
        movie.genre = genre.to_string();
        movie
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("8.8"), 8.8);
        assert_eq!(parse_leading_float("8.8/10"), 8.8);
        assert_eq!(parse_leading_float("  7"), 7.0);
        assert_eq!(parse_leading_float(".5"), 0.5);
        assert_eq!(parse_leading_float("1e2x"), 100.0);
        assert_eq!(parse_leading_float("3e"), 3.0);
        assert!(parse_leading_float("N/A").is_nan());
        assert!(parse_leading_float("").is_nan());
        assert!(parse_leading_float("-").is_nan());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("2010"), Some(2010));
        assert_eq!(parse_leading_int("2010–2015"), Some(2010));
        assert_eq!(parse_leading_int("2019–"), Some(2019));
        assert_eq!(parse_leading_int("N/A"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_compare_ratings() {
        assert_eq!(compare_ratings(&rated("8.8"), &rated("7.1")), RatingVerdict::FirstHigher);
        assert_eq!(compare_ratings(&rated("6.0"), &rated("7.1")), RatingVerdict::SecondHigher);
        assert_eq!(compare_ratings(&rated("7.0"), &rated("7")), RatingVerdict::Tied);
    }

    #[test]
    fn test_unrated_pair_is_tied() {
        assert_eq!(compare_ratings(&rated("N/A"), &rated("N/A")), RatingVerdict::Tied);
    }

    #[test]
    fn test_one_unrated_side_is_tied() {
        assert_eq!(compare_ratings(&rated("N/A"), &rated("9.0")), RatingVerdict::Tied);
    }

    #[test]
    fn test_year_gap() {
        assert_eq!(year_gap(&released("2010"), &released("2014")), YearGap::Apart(4));
        assert_eq!(year_gap(&released("2014"), &released("2010")), YearGap::Apart(4));
        assert_eq!(year_gap(&released("2008–2013"), &released("2008")), YearGap::SameYear);
        assert_eq!(year_gap(&released("N/A"), &released("2008")), YearGap::SameYear);
    }

    #[test]
    fn test_genre_overlap_example() {
        let overlap = genre_overlap(&genred("Action, Sci-Fi, Thriller"), &genred("Sci-Fi, Drama"));
        assert_eq!(overlap.shared, vec!["Sci-Fi".to_string()]);
        assert_eq!(overlap.len(), 1);
    }

    #[test]
    fn test_genre_overlap_keeps_first_movie_order() {
        let overlap = genre_overlap(
            &genred("Drama, Crime, Thriller"),
            &genred("Thriller, Crime, Drama"),
        );
        assert_eq!(overlap.shared, vec!["Drama", "Crime", "Thriller"]);
    }

    #[test]
    fn test_genre_overlap_compares_tokens_literally() {
        // The "N/A" sentinel is just another token
        assert_eq!(genre_overlap(&genred("N/A"), &genred("N/A")).shared, vec!["N/A"]);
        assert!(genre_overlap(&genred("N/A"), &genred("Drama")).is_empty());
        // Only ", " separates; "Drama,Crime" is one token
        assert!(genre_overlap(&genred("Drama,Crime"), &genred("Drama, Crime")).is_empty());
    }

    #[test]
    fn test_genre_overlap_collapses_repeated_tokens() {
        let overlap = genre_overlap(&genred("Drama, Drama, Crime"), &genred("Crime, Drama"));
        assert_eq!(overlap.shared, vec!["Drama", "Crime"]);
        assert_eq!(overlap.len(), 2);
    }

    #[test]
    fn test_rating_band() {
        assert_eq!(rating_band("8.0"), RatingBand::High);
        assert_eq!(rating_band("7.9"), RatingBand::Mid);
        assert_eq!(rating_band("6.0"), RatingBand::Mid);
        assert_eq!(rating_band("5.9"), RatingBand::Low);
        assert_eq!(rating_band("N/A"), RatingBand::Low);
    }

    #[test]
    fn test_report_between() {
        let mut first = detail("tt1375666", "Inception");
        first.genre = "Action, Sci-Fi, Thriller".to_string();
        let mut second = detail("tt0816692", "Interstellar");
        second.genre = "Sci-Fi, Drama".to_string();
        second.year = "2014".to_string();
        second.imdb_rating = "8.7".to_string();

        let report = ComparisonReport::between(&first, &second);
        assert_eq!(report.rating, RatingVerdict::FirstHigher);
        assert_eq!(report.rating_bands, [RatingBand::High, RatingBand::High]);
        assert_eq!(report.year_gap, YearGap::Apart(4));
        assert_eq!(report.shared_genre_count, 1);
    }

    #[test]
    fn test_year_gap_serializes_tagged() {
        let json = serde_json::to_value(YearGap::Apart(4)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "apart", "years": 4}));
        let json = serde_json::to_value(YearGap::SameYear).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "same_year"}));
    }
}
