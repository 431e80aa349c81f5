use std::collections::BTreeSet;

use crate::{
    error::AppResult,
    models::{CatalogQuery, Genre, Movie, NamedFilter},
    services::{catalog::CatalogService, pagination, validity},
};

/// What the search page asks for
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub term: String,
    pub genres: BTreeSet<Genre>,
    pub filters: Vec<NamedFilter>,
    pub page_num: u32,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            genres: BTreeSet::new(),
            filters: Vec::new(),
            page_num: 1,
        }
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = Genre>) -> Self {
        self.genres.extend(genres);
        self
    }

    pub fn with_filter(mut self, filter: NamedFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn page(mut self, page_num: u32) -> Self {
        self.page_num = page_num;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub movies: Vec<Movie>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

#[derive(Clone)]
pub struct SearchService {
    catalog: CatalogService,
    page_size: u32,
}

impl SearchService {
    pub fn new(catalog: CatalogService, page_size: u32) -> Self {
        Self { catalog, page_size }
    }

    /// One page of matches, enriched and sorted by rating
    pub async fn search(&self, request: &SearchRequest) -> AppResult<SearchResults> {
        let query = CatalogQuery::new(self.page_size, request.page_num.max(1))
            .with_genres(request.genres.iter().copied())
            .with_search_term(request.term.clone());
        let query = request
            .filters
            .iter()
            .cloned()
            .fold(query, CatalogQuery::with_filter);

        let page = self.catalog.fetch_catalog_page(&query).await?;
        let total_pages = page.total_pages(self.page_size);

        tracing::info!(
            term = %request.term.trim(),
            genres = request.genres.len(),
            page = query.page_num,
            total = ?page.total,
            "Search completed"
        );

        Ok(SearchResults {
            total: page.total_or_len(),
            page: query.page_num,
            total_pages,
            movies: page.movies,
        })
    }

    /// Up to `limit` matches for a search box dropdown; only movies with a
    /// loadable poster are offered
    pub async fn suggestions(&self, term: &str, limit: usize) -> AppResult<Vec<Movie>> {
        if term.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let page_size = u32::try_from(limit).unwrap_or(u32::MAX);
        let query = CatalogQuery::new(page_size, 1).with_search_term(term);
        let mut page = self.catalog.backend().list_movies(&query).await?;
        self.catalog.attach_posters(&mut page.movies).await;

        let mut movies = validity::retain_valid(self.catalog.backend(), page.movies).await;
        movies.truncate(limit);
        Ok(movies)
    }

    /// Clamps a requested page to the range the last search reported
    pub fn clamp_page(&self, page_num: u32, total: u64) -> u32 {
        pagination::clamp_page(page_num, total, self.page_size)
    }
}
