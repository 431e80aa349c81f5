//! reqwest implementation of the catalog backend contract
//!
//! Endpoint layout:
//! - `/Movie/AllMovies`, `/Movie/AllMoviesAZ`: paged listings
//! - `/Movie/PosterUrl/{showId}`: plain-text poster URL
//! - `/Movie/AverageRating/{showId}`: rating aggregate, 404 when unrated
//! - `/Movie/SubmitRating`, `/Movie/UserRating/{showId}/{userId}`: user ratings
//! - `/AdminMovie/...`: catalog management, bearer token required

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::tag_request,
    models::{
        ApiMovie, CatalogQuery, ListingResponse, Movie, MoviePage, RatingInfo, ShowId,
        SubmitRatingRequest, UserRatingResponse,
    },
    services::backend::CatalogBackend,
    session::Session,
};
use reqwest::{header, Client as HttpClient, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::Instrument;

#[derive(Clone, Debug)]
pub struct HttpBackend {
    http_client: HttpClient,
    api_url: Url,
    session: Session,
}

impl HttpBackend {
    /// Creates a backend client that keeps session cookies between requests
    pub fn new(api_url: &str, timeout: Duration, session: Session) -> AppResult<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| AppError::Config(format!("Invalid api_url {}: {}", api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(AppError::Config(format!("api_url {} cannot be a base", api_url)));
        }

        let http_client = HttpClient::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        tracing::info!(api_url = %api_url, "Catalog backend client created");

        Ok(Self {
            http_client,
            api_url,
            session,
        })
    }

    /// Builds an endpoint URL, percent-encoding each path segment
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("api_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and maps non-success statuses onto [`AppError`]
    async fn send(&self, builder: RequestBuilder, method: &str, path: &str) -> AppResult<Response> {
        let (builder, span) = tag_request(builder, method, path);

        let response = builder.send().instrument(span.clone()).await?;
        let status = response.status();

        span.in_scope(|| tracing::debug!(status = %status, "Backend responded"));

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AppError::Unauthorized(format!("{} {} returned {}", method, path, status)))
            }
            StatusCode::NOT_FOUND => Err(AppError::NotFound(path.to_string())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                span.in_scope(|| {
                    tracing::warn!(status = %status, body = %body, "Backend request failed")
                });
                Err(AppError::ExternalApi {
                    status,
                    message: body,
                })
            }
        }
    }

    /// Attaches the session's bearer token, failing fast when there is none
    async fn authorized(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self.session.bearer_token().await.ok_or_else(|| {
            AppError::Unauthorized("Admin request without a bearer token".to_string())
        })?;
        Ok(builder.bearer_auth(token))
    }

    async fn decode_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, response = %text, "Failed to deserialize backend response");
            AppError::Decode(e.to_string())
        })
    }

    /// Admin endpoints may echo the stored movie or reply with an empty body
    async fn decode_movie_or(response: Response, fallback: &Movie) -> AppResult<Movie> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(fallback.clone());
        }
        serde_json::from_str::<ApiMovie>(&text)
            .map_err(|e| AppError::Decode(e.to_string()))
            .and_then(|api| Movie::try_from(api).map_err(AppError::Decode))
    }
}

/// Poster endpoint returns plain text, occasionally JSON-quoted
fn clean_poster_text(text: &str) -> String {
    text.trim().trim_matches('"').trim().to_string()
}

#[async_trait::async_trait]
impl CatalogBackend for HttpBackend {
    async fn list_movies(&self, query: &CatalogQuery) -> AppResult<MoviePage> {
        let path = "/Movie/AllMovies";
        let url = self.endpoint(&["Movie", "AllMovies"])?;
        let request = self.http_client.get(url).query(&query.to_query_pairs());

        let response = self.send(request, "GET", path).await?;
        let listing: ListingResponse = Self::decode_json(response).await?;
        let page = MoviePage::from(listing);

        tracing::info!(
            page_num = query.page_num,
            page_size = query.page_size,
            genres = query.genres.len(),
            results = page.movies.len(),
            total = ?page.total,
            "Movie listing fetched"
        );

        Ok(page)
    }

    async fn list_movies_az(&self, page_size: u32, page_num: u32) -> AppResult<MoviePage> {
        let path = "/Movie/AllMoviesAZ";
        let url = self.endpoint(&["Movie", "AllMoviesAZ"])?;
        let request = self
            .http_client
            .get(url)
            .query(&[("pageSize", page_size), ("pageNum", page_num)]);

        let response = self.send(request, "GET", path).await?;
        let listing: ListingResponse = Self::decode_json(response).await?;
        let page = MoviePage::from(listing);

        tracing::info!(
            page_num = page_num,
            results = page.movies.len(),
            "Alphabetical listing fetched"
        );

        Ok(page)
    }

    async fn poster_url(&self, show_id: &ShowId) -> AppResult<String> {
        let path = format!("/Movie/PosterUrl/{}", show_id);
        let url = self.endpoint(&["Movie", "PosterUrl", show_id.as_str()])?;
        let response = self.send(self.http_client.get(url), "GET", &path).await?;
        let text = response.text().await?;
        Ok(clean_poster_text(&text))
    }

    async fn average_rating(&self, show_id: &ShowId) -> AppResult<RatingInfo> {
        let path = format!("/Movie/AverageRating/{}", show_id);
        let url = self.endpoint(&["Movie", "AverageRating", show_id.as_str()])?;

        match self.send(self.http_client.get(url), "GET", &path).await {
            Ok(response) => Self::decode_json(response).await,
            Err(AppError::NotFound(_)) => Ok(RatingInfo::NONE),
            Err(e) => Err(e),
        }
    }

    async fn submit_rating(&self, request: &SubmitRatingRequest) -> AppResult<()> {
        let path = "/Movie/SubmitRating";
        let url = self.endpoint(&["Movie", "SubmitRating"])?;
        self.send(self.http_client.post(url).json(request), "POST", path)
            .await?;

        tracing::info!(
            show_id = %request.show_id,
            user_id = request.user_id,
            rating = request.rating,
            "Rating submitted"
        );

        Ok(())
    }

    async fn user_rating(&self, show_id: &ShowId, user_id: i64) -> AppResult<Option<u8>> {
        let user = user_id.to_string();
        let path = format!("/Movie/UserRating/{}/{}", show_id, user);
        let url = self.endpoint(&["Movie", "UserRating", show_id.as_str(), &user])?;

        match self.send(self.http_client.get(url), "GET", &path).await {
            Ok(response) => {
                let body: UserRatingResponse = Self::decode_json(response).await?;
                Ok(body.rating.filter(|r| *r > 0))
            }
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add_movie(&self, movie: &Movie) -> AppResult<Movie> {
        let path = "/AdminMovie/AddMovie";
        let url = self.endpoint(&["AdminMovie", "AddMovie"])?;
        let request = self.authorized(self.http_client.post(url).json(movie)).await?;

        let response = self.send(request, "POST", path).await?;
        let stored = Self::decode_movie_or(response, movie).await?;

        tracing::info!(show_id = %stored.show_id, "Movie added");
        Ok(stored)
    }

    async fn update_movie(&self, movie: &Movie) -> AppResult<Movie> {
        let path = format!("/AdminMovie/UpdateMovie/{}", movie.show_id);
        let url = self.endpoint(&["AdminMovie", "UpdateMovie", movie.show_id.as_str()])?;
        let request = self.authorized(self.http_client.put(url).json(movie)).await?;

        let response = self.send(request, "PUT", &path).await?;
        let stored = Self::decode_movie_or(response, movie).await?;

        tracing::info!(show_id = %stored.show_id, "Movie updated");
        Ok(stored)
    }

    async fn delete_movie(&self, show_id: &ShowId) -> AppResult<()> {
        let path = format!("/AdminMovie/DeleteMovie/{}", show_id);
        let url = self.endpoint(&["AdminMovie", "DeleteMovie", show_id.as_str()])?;
        let request = self.authorized(self.http_client.delete(url)).await?;

        self.send(request, "DELETE", &path).await?;

        tracing::info!(show_id = %show_id, "Movie deleted");
        Ok(())
    }

    async fn probe_image(&self, url: &str) -> AppResult<bool> {
        let url = Url::parse(url)
            .map_err(|e| AppError::InvalidInput(format!("Invalid poster URL {}: {}", url, e)))?;

        let (request, span) = tag_request(self.http_client.get(url.clone()), "GET", url.path());
        let response = request.send().instrument(span.clone()).await?;
        if !response.status().is_success() {
            span.in_scope(|| {
                tracing::debug!(url = %url, status = %response.status(), "Poster probe failed")
            });
            return Ok(false);
        }

        let is_image = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase().starts_with("image/"))
            .unwrap_or(false);

        Ok(is_image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_backend(api_url: &str) -> HttpBackend {
        HttpBackend::new(api_url, Duration::from_secs(5), Session::default()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let backend = create_test_backend("http://test.local/api/");
        let url = backend.endpoint(&["Movie", "PosterUrl", "s12"]).unwrap();
        assert_eq!(url.as_str(), "http://test.local/api/Movie/PosterUrl/s12");
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let backend = create_test_backend("http://test.local");
        let url = backend.endpoint(&["Movie", "AllMoviesAZ"]).unwrap();
        assert_eq!(url.as_str(), "http://test.local/Movie/AllMoviesAZ");
    }

    #[test]
    fn test_endpoint_encodes_show_id() {
        let backend = create_test_backend("http://test.local");
        let url = backend.endpoint(&["Movie", "AverageRating", "s 1/2"]).unwrap();
        assert_eq!(url.as_str(), "http://test.local/Movie/AverageRating/s%201%2F2");
    }

    #[test]
    fn test_invalid_api_url() {
        let result = HttpBackend::new("not a url", Duration::from_secs(5), Session::default());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_clean_poster_text() {
        assert_eq!(
            clean_poster_text("  https://img.example.com/p.jpg\n"),
            "https://img.example.com/p.jpg"
        );
        assert_eq!(
            clean_poster_text("\"https://img.example.com/p.jpg\""),
            "https://img.example.com/p.jpg"
        );
        assert_eq!(clean_poster_text(""), "");
    }

    #[tokio::test]
    async fn test_admin_request_requires_token() {
        let backend = create_test_backend("http://test.local");
        let result = backend.delete_movie(&ShowId::new("s1")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
