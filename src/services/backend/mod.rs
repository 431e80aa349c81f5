//! Catalog backend abstraction
//!
//! Every call the client makes to the movie backend goes through this trait,
//! so the enrichment, ranking and paging services can be exercised against a
//! mock in tests and against [`http::HttpBackend`] in the application.

use crate::{
    error::AppResult,
    models::{CatalogQuery, Movie, MoviePage, RatingInfo, ShowId, SubmitRatingRequest},
};

pub mod http;

pub use http::HttpBackend;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Paged, filterable listing (`/Movie/AllMovies`)
    async fn list_movies(&self, query: &CatalogQuery) -> AppResult<MoviePage>;

    /// Paged listing ordered by title (`/Movie/AllMoviesAZ`)
    async fn list_movies_az(&self, page_size: u32, page_num: u32) -> AppResult<MoviePage>;

    /// Poster image URL for a movie
    async fn poster_url(&self, show_id: &ShowId) -> AppResult<String>;

    /// Rating aggregate; movies without reviews yield [`RatingInfo::NONE`]
    async fn average_rating(&self, show_id: &ShowId) -> AppResult<RatingInfo>;

    async fn submit_rating(&self, request: &SubmitRatingRequest) -> AppResult<()>;

    /// The user's own rating, if they rated the movie
    async fn user_rating(&self, show_id: &ShowId, user_id: i64) -> AppResult<Option<u8>>;

    async fn add_movie(&self, movie: &Movie) -> AppResult<Movie>;

    async fn update_movie(&self, movie: &Movie) -> AppResult<Movie>;

    async fn delete_movie(&self, show_id: &ShowId) -> AppResult<()>;

    /// Whether `url` loads as an image resource
    async fn probe_image(&self, url: &str) -> AppResult<bool>;
}
