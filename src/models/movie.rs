use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use super::Genre;

/// Catalog key of a movie or show (e.g. "s8123")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowId(String);

impl ShowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A catalog entry with its client-side enrichment.
///
/// `poster_url` and `average_star_rating` are not part of the listing payload;
/// the enrichment pipeline fills them in after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ApiMovie", into = "ApiMovie")]
pub struct Movie {
    pub show_id: ShowId,
    pub title: String,
    /// "Movie" or "TV Show"
    pub kind: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub release_year: Option<i32>,
    /// Content rating such as "PG-13"
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub genres: BTreeSet<Genre>,
    pub poster_url: Option<String>,
    pub average_star_rating: f64,
}

impl Movie {
    pub fn new(show_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            show_id: ShowId::new(show_id),
            title: title.into(),
            kind: None,
            director: None,
            cast: None,
            country: None,
            release_year: None,
            rating: None,
            duration: None,
            description: None,
            genres: BTreeSet::new(),
            poster_url: None,
            average_star_rating: 0.0,
        }
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = Genre>) -> Self {
        self.genres.extend(genres);
        self
    }

    pub fn has_genre(&self, genre: Genre) -> bool {
        self.genres.contains(&genre)
    }
}

/// Wire shape of a movie: flat camelCase object with one 0/1 field per genre
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMovie {
    pub show_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_star_rating: Option<f64>,
    /// Genre flags plus any field this client does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Backend flags are integers, but tolerate booleans and numeric strings
fn flag_is_set(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|v| v > 0.0).unwrap_or(false),
        serde_json::Value::String(s) => s.trim() == "1",
        _ => false,
    }
}

impl TryFrom<ApiMovie> for Movie {
    type Error = String;

    fn try_from(api: ApiMovie) -> Result<Self, Self::Error> {
        if api.show_id.trim().is_empty() {
            return Err("movie is missing showId".to_string());
        }

        let genres = api
            .extra
            .iter()
            .filter(|(_, value)| flag_is_set(value))
            .filter_map(|(field, _)| Genre::from_field(field))
            .collect();

        Ok(Movie {
            show_id: ShowId(api.show_id),
            title: api.title.unwrap_or_default(),
            kind: api.kind,
            director: api.director,
            cast: api.cast,
            country: api.country,
            release_year: api.release_year,
            rating: api.rating,
            duration: api.duration,
            description: api.description,
            genres,
            poster_url: api.poster_url,
            average_star_rating: api.average_star_rating.unwrap_or(0.0),
        })
    }
}

impl From<Movie> for ApiMovie {
    fn from(movie: Movie) -> Self {
        let extra = Genre::ALL
            .iter()
            .map(|genre| {
                let flag = u8::from(movie.genres.contains(genre));
                (genre.field_name().to_string(), serde_json::Value::from(flag))
            })
            .collect();

        ApiMovie {
            show_id: movie.show_id.0,
            title: Some(movie.title),
            kind: movie.kind,
            director: movie.director,
            cast: movie.cast,
            country: movie.country,
            release_year: movie.release_year,
            rating: movie.rating,
            duration: movie.duration,
            description: movie.description,
            poster_url: movie.poster_url,
            average_star_rating: Some(movie.average_star_rating),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_show_id_display() {
        let id = ShowId::new("s8123");
        assert_eq!(format!("{}", id), "s8123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"s8123\"");
    }

    #[test]
    fn test_movie_decodes_genre_flags() {
        let movie: Movie = serde_json::from_value(json!({
            "showId": "s1",
            "type": "Movie",
            "title": "Dick Johnson Is Dead",
            "director": "Kirsten Johnson",
            "releaseYear": 2020,
            "rating": "PG-13",
            "duration": "90 min",
            "action": 0,
            "documentaries": 1,
            "dramas": 1,
            "someNewColumn": 1
        }))
        .unwrap();

        assert_eq!(movie.show_id, ShowId::new("s1"));
        assert_eq!(movie.kind.as_deref(), Some("Movie"));
        assert_eq!(movie.release_year, Some(2020));
        assert_eq!(
            movie.genres,
            BTreeSet::from([Genre::Documentaries, Genre::Dramas])
        );
        assert_eq!(movie.poster_url, None);
        assert_eq!(movie.average_star_rating, 0.0);
    }

    #[test]
    fn test_movie_tolerates_missing_descriptive_fields() {
        let movie: Movie = serde_json::from_value(json!({ "showId": "s2" })).unwrap();
        assert_eq!(movie.title, "");
        assert!(movie.genres.is_empty());
        assert_eq!(movie.director, None);
    }

    #[test]
    fn test_movie_requires_show_id() {
        assert!(serde_json::from_value::<Movie>(json!({ "title": "No id" })).is_err());
        assert!(serde_json::from_value::<Movie>(json!({ "showId": " " })).is_err());
    }

    #[test]
    fn test_flag_values() {
        assert!(flag_is_set(&json!(1)));
        assert!(flag_is_set(&json!(true)));
        assert!(flag_is_set(&json!("1")));
        assert!(!flag_is_set(&json!(0)));
        assert!(!flag_is_set(&json!(null)));
        assert!(!flag_is_set(&json!("yes")));
    }

    #[test]
    fn test_movie_serializes_every_genre_flag() {
        let movie = Movie::new("s3", "Blood & Water").with_genres([Genre::TvDramas]);
        let value = serde_json::to_value(&movie).unwrap();

        assert_eq!(value["showId"], "s3");
        assert_eq!(value["title"], "Blood & Water");
        assert_eq!(value["tvDramas"], 1);
        assert_eq!(value["action"], 0);
        assert_eq!(value["kidsTv"], 0);
        assert!(value.get("posterUrl").is_none());
    }
}
