use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

pub mod genre;
pub mod movie;

pub use genre::Genre;
pub use movie::{ApiMovie, Movie, ShowId};

/// Rating aggregate for one movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingInfo {
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl RatingInfo {
    /// What a movie without reviews (or a failed lookup) counts as
    pub const NONE: RatingInfo = RatingInfo {
        average_rating: 0.0,
        review_count: 0,
    };

    pub fn new(average_rating: f64, review_count: u32) -> Self {
        Self {
            average_rating,
            review_count,
        }
    }
}

impl Default for RatingInfo {
    fn default() -> Self {
        Self::NONE
    }
}

/// A movie together with its smoothed rating for one ranking pass
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedScore {
    pub movie: Movie,
    pub weighted_rating: f64,
}

/// One page of catalog results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    /// Total matches across all pages; `None` when the backend sent a bare
    /// array without a count
    pub total: Option<u64>,
}

impl MoviePage {
    /// The reported total, or the size of this page when there is none
    pub fn total_or_len(&self) -> u64 {
        self.total.unwrap_or(self.movies.len() as u64)
    }

    pub fn total_pages(&self, page_size: u32) -> u64 {
        crate::services::pagination::total_pages(self.total_or_len(), page_size)
    }
}

/// Listing payload: either an envelope with a total or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListingResponse {
    Paged {
        movies: Vec<Movie>,
        #[serde(rename = "totalNumMovies", default)]
        total_num_movies: Option<u64>,
    },
    Raw(Vec<Movie>),
}

impl From<ListingResponse> for MoviePage {
    fn from(response: ListingResponse) -> Self {
        match response {
            ListingResponse::Paged {
                movies,
                total_num_movies,
            } => MoviePage {
                movies,
                total: total_num_movies,
            },
            ListingResponse::Raw(movies) => MoviePage {
                movies,
                total: None,
            },
        }
    }
}

/// Named listing filter understood by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamedFilter {
    TopRated,
    Other(String),
}

impl NamedFilter {
    pub fn as_token(&self) -> &str {
        match self {
            NamedFilter::TopRated => "topRated",
            NamedFilter::Other(token) => token,
        }
    }
}

impl Display for NamedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

impl From<&str> for NamedFilter {
    fn from(token: &str) -> Self {
        match token {
            "topRated" => NamedFilter::TopRated,
            other => NamedFilter::Other(other.to_string()),
        }
    }
}

/// Parameters of a catalog listing request
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub page_size: u32,
    /// 1-indexed
    pub page_num: u32,
    pub genres: BTreeSet<Genre>,
    pub search_term: String,
    pub filters: Vec<NamedFilter>,
}

impl CatalogQuery {
    pub fn new(page_size: u32, page_num: u32) -> Self {
        Self {
            page_size,
            page_num,
            genres: BTreeSet::new(),
            search_term: String::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = Genre>) -> Self {
        self.genres.extend(genres);
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_filter(mut self, filter: NamedFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Query string pairs in the order the backend documents them
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageSize", self.page_size.to_string()),
            ("pageNum", self.page_num.to_string()),
        ];
        pairs.extend(
            self.genres
                .iter()
                .map(|genre| ("movieTypes", genre.field_name().to_string())),
        );
        let term = self.search_term.trim();
        if !term.is_empty() {
            pairs.push(("searchTerm", term.to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .map(|filter| ("filters", filter.as_token().to_string())),
        );
        pairs
    }
}

/// Body of `POST /Movie/SubmitRating`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub show_id: ShowId,
    pub user_id: i64,
    pub rating: u8,
}

/// Response of `GET /Movie/UserRating/{showId}/{userId}`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct UserRatingResponse {
    pub rating: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_info_decodes_camel_case() {
        let info: RatingInfo =
            serde_json::from_value(json!({ "averageRating": 4.5, "reviewCount": 12 })).unwrap();
        assert_eq!(info, RatingInfo::new(4.5, 12));
    }

    #[test]
    fn test_rating_info_defaults_missing_fields() {
        let info: RatingInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(info, RatingInfo::NONE);
    }

    #[test]
    fn test_listing_response_envelope() {
        let response: ListingResponse = serde_json::from_value(json!({
            "movies": [{ "showId": "s1", "title": "A" }, { "showId": "s2", "title": "B" }],
            "totalNumMovies": 45
        }))
        .unwrap();

        let page = MoviePage::from(response);
        assert_eq!(page.movies.len(), 2);
        assert_eq!(page.total, Some(45));
        assert_eq!(page.total_pages(10), 5);
    }

    #[test]
    fn test_listing_response_raw_array() {
        let response: ListingResponse = serde_json::from_value(json!([
            { "showId": "s1", "title": "A" },
            { "showId": "s2", "title": "B" },
            { "showId": "s3", "title": "C" }
        ]))
        .unwrap();

        let page = MoviePage::from(response);
        assert_eq!(page.movies.len(), 3);
        assert_eq!(page.total, None);
        assert_eq!(page.total_or_len(), 3);
    }

    #[test]
    fn test_query_pairs() {
        let query = CatalogQuery::new(10, 2)
            .with_genres([Genre::Dramas, Genre::Action])
            .with_search_term("  love ")
            .with_filter(NamedFilter::TopRated);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("pageSize", "10".to_string()),
                ("pageNum", "2".to_string()),
                ("movieTypes", "action".to_string()),
                ("movieTypes", "dramas".to_string()),
                ("searchTerm", "love".to_string()),
                ("filters", "topRated".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_skip_blank_search_term() {
        let query = CatalogQuery::new(20, 1).with_search_term("   ");
        assert!(query.to_query_pairs().iter().all(|(k, _)| *k != "searchTerm"));
    }

    #[test]
    fn test_named_filter_tokens() {
        assert_eq!(NamedFilter::from("topRated"), NamedFilter::TopRated);
        assert_eq!(NamedFilter::from("recent").as_token(), "recent");
    }

    #[test]
    fn test_submit_rating_body() {
        let body = SubmitRatingRequest {
            show_id: ShowId::new("s7"),
            user_id: 3,
            rating: 4,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "showId": "s7", "userId": 3, "rating": 4 })
        );
    }
}
