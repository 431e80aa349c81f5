use std::collections::{BTreeMap, HashMap};

use crate::{
    error::AppResult,
    models::{CatalogQuery, Genre, Movie, RatingInfo, ShowId, WeightedScore},
    services::{
        catalog::CatalogService,
        ranking::{rank, RankingParams, RatedMovie},
        scope::FetchScope,
    },
    session::Session,
};

/// Ranked lists shown on the home page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeFeed {
    pub trending: Vec<WeightedScore>,
    pub by_genre: BTreeMap<Genre, Vec<WeightedScore>>,
}

impl HomeFeed {
    /// Every movie entry in the feed, trending first
    fn entries_mut(&mut self) -> impl Iterator<Item = &mut WeightedScore> {
        self.trending
            .iter_mut()
            .chain(self.by_genre.values_mut().flatten())
    }
}

/// Builds the home page: catalog pull, cached rating lookups, ranking,
/// then posters for whatever made it into a list
pub struct HomeService {
    catalog: CatalogService,
    session: Session,
    params: RankingParams,
    page_size: u32,
    catalog_size: u32,
}

impl HomeService {
    pub fn new(
        catalog: CatalogService,
        session: Session,
        params: RankingParams,
        page_size: u32,
        catalog_size: u32,
    ) -> Self {
        Self {
            catalog,
            session,
            params,
            page_size: page_size.max(1),
            catalog_size,
        }
    }

    pub async fn build(&self, scope: &FetchScope) -> AppResult<HomeFeed> {
        let movies = scope.run(self.fetch_catalog()).await?;
        let rated = scope.run(async { Ok(self.rate(movies).await) }).await?;

        let rankings = rank(&rated, &self.params);
        let mut feed = HomeFeed {
            trending: rankings.trending,
            by_genre: rankings.by_genre,
        };

        scope
            .run(async {
                self.attach_posters(&mut feed).await;
                Ok(())
            })
            .await?;

        tracing::info!(
            scored = rated.len(),
            genres = feed.by_genre.len(),
            trending = feed.trending.len(),
            "Home feed built"
        );

        Ok(feed)
    }

    /// Pulls listing pages until `catalog_size` movies are collected or the
    /// backend runs out. Only a failure on the first page is fatal.
    async fn fetch_catalog(&self) -> AppResult<Vec<Movie>> {
        let mut movies: Vec<Movie> = Vec::new();
        let mut page_num = 1;

        while movies.len() < self.catalog_size as usize {
            let query = CatalogQuery::new(self.page_size, page_num);
            let page = match self.catalog.backend().list_movies(&query).await {
                Ok(page) => page,
                Err(e) if page_num > 1 => {
                    tracing::warn!(
                        page_num = page_num,
                        error = %e,
                        "Stopping home catalog pull early"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            let fetched = page.movies.len();
            movies.extend(page.movies);

            // a bare-array listing reports no total; only a short page ends it
            let reached_total = page
                .total
                .is_some_and(|total| movies.len() as u64 >= total);
            if fetched < self.page_size as usize || reached_total {
                break;
            }
            page_num += 1;
        }

        movies.truncate(self.catalog_size as usize);
        Ok(movies)
    }

    /// Rating aggregates through the session cache; only misses hit the
    /// backend, and only successful lookups are cached
    pub async fn ratings_for(&self, show_ids: &[ShowId]) -> HashMap<ShowId, RatingInfo> {
        let (mut ratings, misses) = self.session.cached_ratings(show_ids).await;

        tracing::debug!(
            requested = show_ids.len(),
            cached = ratings.len(),
            misses = misses.len(),
            "Resolving ratings"
        );

        if misses.is_empty() {
            return ratings;
        }

        let batch = self.catalog.fetch_ratings_batch(&misses).await;
        let cacheable: HashMap<ShowId, RatingInfo> = batch
            .ratings
            .iter()
            .filter(|(show_id, _)| !batch.failed.contains(*show_id))
            .map(|(show_id, info)| (show_id.clone(), *info))
            .collect();
        self.session.store_ratings(&cacheable).await;

        ratings.extend(batch.ratings);
        ratings
    }

    /// Looks ratings up one ranking batch at a time
    async fn rate(&self, movies: Vec<Movie>) -> Vec<RatedMovie> {
        let mut rated = Vec::with_capacity(movies.len());
        let batch_size = self.params.batch_size.max(1);

        for batch in movies.chunks(batch_size) {
            let ids: Vec<ShowId> = batch.iter().map(|m| m.show_id.clone()).collect();
            let ratings = self.ratings_for(&ids).await;

            for movie in batch {
                let info = ratings.get(&movie.show_id).copied().unwrap_or(RatingInfo::NONE);
                let mut movie = movie.clone();
                movie.average_star_rating = info.average_rating;
                rated.push(RatedMovie::new(movie, info));
            }
        }

        rated
    }

    /// One poster lookup per distinct movie in the feed
    async fn attach_posters(&self, feed: &mut HomeFeed) {
        let mut distinct: Vec<Movie> = Vec::new();
        for entry in feed.entries_mut() {
            if !distinct.iter().any(|m| m.show_id == entry.movie.show_id) {
                distinct.push(entry.movie.clone());
            }
        }

        self.catalog.attach_posters(&mut distinct).await;

        let posters: HashMap<ShowId, String> = distinct
            .into_iter()
            .filter_map(|movie| movie.poster_url.map(|url| (movie.show_id, url)))
            .collect();

        for entry in feed.entries_mut() {
            if let Some(url) = posters.get(&entry.movie.show_id) {
                entry.movie.poster_url = Some(url.clone());
            }
        }
    }
}
