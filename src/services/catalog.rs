use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogQuery, Movie, MoviePage, RatingInfo, ShowId},
    services::backend::CatalogBackend,
};

/// What one enrichment task learned about a movie
#[derive(Debug, Default)]
struct Enrichment {
    poster_url: Option<String>,
    average_rating: Option<f64>,
}

/// Result of a ratings fan-out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingsBatch {
    /// One entry per requested ID; failed lookups hold [`RatingInfo::NONE`]
    pub ratings: HashMap<ShowId, RatingInfo>,
    /// IDs whose lookup failed, so callers can avoid caching the default
    pub failed: HashSet<ShowId>,
}

/// Catalog listing plus per-movie poster and rating enrichment
///
/// Enrichment fans out one task per movie. A failed poster or rating lookup
/// only degrades that movie; a failed listing fails the call.
#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn CatalogBackend>,
}

impl CatalogService {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> Arc<dyn CatalogBackend> {
        self.backend.clone()
    }

    /// Fetches one listing page and enriches every movie with poster and rating.
    ///
    /// The returned movies are re-sorted by `average_star_rating`, highest
    /// first; movies with equal ratings keep the backend's order.
    pub async fn fetch_catalog_page(&self, query: &CatalogQuery) -> AppResult<MoviePage> {
        validate_paging(query.page_size, query.page_num)?;

        let mut page = self.backend.list_movies(query).await?;
        let enrichments = self.enrich(&page.movies, true).await;

        for (movie, enrichment) in page.movies.iter_mut().zip(enrichments) {
            if enrichment.poster_url.is_some() {
                movie.poster_url = enrichment.poster_url;
            }
            movie.average_star_rating = enrichment
                .average_rating
                .filter(|r| r.is_finite())
                .unwrap_or(0.0);
        }

        // stable: equal ratings keep backend order
        page.movies
            .sort_by(|a, b| b.average_star_rating.total_cmp(&a.average_star_rating));

        tracing::info!(
            page_num = query.page_num,
            results = page.movies.len(),
            total = ?page.total,
            "Catalog page enriched"
        );

        Ok(page)
    }

    /// Fetches one page of the title-ordered listing with posters only
    pub async fn fetch_alphabetical_page(&self, page_size: u32, page_num: u32) -> AppResult<MoviePage> {
        validate_paging(page_size, page_num)?;

        let mut page = self.backend.list_movies_az(page_size, page_num).await?;
        self.attach_posters(&mut page.movies).await;
        Ok(page)
    }

    /// Fills in `poster_url` for every movie that does not have one yet
    pub async fn attach_posters(&self, movies: &mut [Movie]) {
        let missing: Vec<usize> = movies
            .iter()
            .enumerate()
            .filter(|(_, movie)| movie.poster_url.is_none())
            .map(|(index, _)| index)
            .collect();

        if missing.is_empty() {
            return;
        }

        let pending: Vec<Movie> = missing.iter().map(|&i| movies[i].clone()).collect();
        let enrichments = self.enrich(&pending, false).await;

        for (index, enrichment) in missing.into_iter().zip(enrichments) {
            if enrichment.poster_url.is_some() {
                movies[index].poster_url = enrichment.poster_url;
            }
        }
    }

    /// Looks up rating aggregates for `show_ids` concurrently.
    ///
    /// Never fails: a lookup that errors is reported as [`RatingInfo::NONE`]
    /// and listed in [`RatingsBatch::failed`].
    pub async fn fetch_ratings_batch(&self, show_ids: &[ShowId]) -> RatingsBatch {
        // dropping the set aborts lookups still in flight
        let mut tasks = JoinSet::new();

        for show_id in show_ids {
            let backend = self.backend.clone();
            let show_id = show_id.clone();
            tasks.spawn(async move {
                let rating = backend.average_rating(&show_id).await;
                (show_id, rating)
            });
        }

        // anything not overwritten below never reported back
        let mut batch = RatingsBatch {
            ratings: show_ids
                .iter()
                .map(|show_id| (show_id.clone(), RatingInfo::NONE))
                .collect(),
            failed: show_ids.iter().cloned().collect(),
        };
        let mut successes = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((show_id, Ok(info))) => {
                    successes += 1;
                    batch.failed.remove(&show_id);
                    batch.ratings.insert(show_id, info);
                }
                Ok((show_id, Err(e))) => {
                    tracing::warn!(show_id = %show_id, error = %e, "Rating lookup failed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                }
            }
        }

        if !batch.failed.is_empty() {
            tracing::warn!(
                success_count = successes,
                error_count = batch.failed.len(),
                "Partial ratings batch failure"
            );
        }

        batch
    }

    /// One task per movie: poster first, then (optionally) the rating.
    /// Results come back in input order.
    async fn enrich(&self, movies: &[Movie], with_rating: bool) -> Vec<Enrichment> {
        let mut tasks = JoinSet::new();

        for (index, movie) in movies.iter().enumerate() {
            let backend = self.backend.clone();
            let show_id = movie.show_id.clone();
            tasks.spawn(async move { (index, enrich_one(backend, show_id, with_rating).await) });
        }

        let mut enrichments: Vec<Enrichment> =
            std::iter::repeat_with(Enrichment::default).take(movies.len()).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, enrichment)) => enrichments[index] = enrichment,
                Err(e) => tracing::error!(error = %e, "Task join error"),
            }
        }

        enrichments
    }
}

async fn enrich_one(
    backend: Arc<dyn CatalogBackend>,
    show_id: ShowId,
    with_rating: bool,
) -> Enrichment {
    let poster_url = match backend.poster_url(&show_id).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(show_id = %show_id, error = %e, "Poster lookup failed");
            None
        }
    };

    let average_rating = if with_rating {
        match backend.average_rating(&show_id).await {
            Ok(info) => Some(info.average_rating),
            Err(e) => {
                tracing::warn!(show_id = %show_id, error = %e, "Rating lookup failed");
                None
            }
        }
    } else {
        None
    };

    Enrichment {
        poster_url,
        average_rating,
    }
}

fn validate_paging(page_size: u32, page_num: u32) -> AppResult<()> {
    if page_size == 0 {
        return Err(AppError::InvalidInput("Page size must be positive".to_string()));
    }
    if page_num == 0 {
        return Err(AppError::InvalidInput(
            "Page number starts at 1".to_string(),
        ));
    }
    Ok(())
}
