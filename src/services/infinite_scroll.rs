//! Append-only alphabetical movie list that grows as the user scrolls.
//!
//! Loading is split into `begin_*` (decides whether a fetch may start and
//! takes the in-progress flag), [`PageLoader::load`] (the network part, which
//! borrows nothing from the feed) and [`AlphabeticalFeed::complete`] (applies
//! the result). The split lets a UI keep handling events while a page is in
//! flight; `mount`/`on_scroll` chain the three steps for callers that don't
//! need that.

use std::future::Future;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MoviePage},
    services::{catalog::CatalogService, scope::FetchScope},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Idle,
    LoadingInitial,
    LoadingMore,
    /// The backend returned a short or empty page
    Exhausted,
    /// Last load failed; another scroll event may retry
    Error,
}

/// Viewport position in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - threshold
    }
}

/// Bounded exponential backoff for page loads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): base, 2×base, 4×base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }

    /// Runs `op`, retrying transient failures until the budget is spent.
    /// Waiting between attempts is cut short if `scope` is cancelled.
    pub async fn run<T, F, Fut>(&self, scope: &FetchScope, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match scope.run(op()).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Page load failed, retrying"
                    );
                    scope
                        .run(async {
                            tokio::time::sleep(delay).await;
                            Ok::<(), AppError>(())
                        })
                        .await?;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Initial,
    More,
}

/// Permission to load one page, handed out while the feed is marked loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    page_num: u32,
    kind: LoadKind,
}

impl LoadTicket {
    pub fn page_num(&self) -> u32 {
        self.page_num
    }
}

/// The network half of a page load
#[derive(Clone)]
pub struct PageLoader {
    catalog: CatalogService,
    scope: FetchScope,
    retry: RetryPolicy,
    page_size: u32,
}

impl PageLoader {
    pub async fn load(&self, ticket: &LoadTicket) -> AppResult<MoviePage> {
        let catalog = &self.catalog;
        let page_size = self.page_size;
        let page_num = ticket.page_num;
        self.retry
            .run(&self.scope, move || catalog.fetch_alphabetical_page(page_size, page_num))
            .await
    }
}

pub struct AlphabeticalFeed {
    catalog: CatalogService,
    scope: FetchScope,
    retry: RetryPolicy,
    page_size: u32,
    scroll_threshold: f64,
    movies: Vec<Movie>,
    current_page: u32,
    has_more: bool,
    loading: bool,
    state: ScrollState,
    generation: u64,
    last_error: Option<String>,
}

impl AlphabeticalFeed {
    pub fn new(
        catalog: CatalogService,
        page_size: u32,
        scroll_threshold: f64,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            catalog,
            scope: FetchScope::new(),
            retry,
            page_size: page_size.max(1),
            scroll_threshold,
            movies: Vec::new(),
            current_page: 0,
            has_more: true,
            loading: false,
            state: ScrollState::Idle,
            generation: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Inline message for the last failed load, if it has not been recovered
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn loader(&self) -> PageLoader {
        PageLoader {
            catalog: self.catalog.clone(),
            scope: self.scope.clone(),
            retry: self.retry,
            page_size: self.page_size,
        }
    }

    fn issue(&mut self, kind: LoadKind) -> LoadTicket {
        self.loading = true;
        self.state = match kind {
            LoadKind::Initial => ScrollState::LoadingInitial,
            LoadKind::More => ScrollState::LoadingMore,
        };
        LoadTicket {
            generation: self.generation,
            page_num: self.current_page + 1,
            kind,
        }
    }

    /// First page, only from a fresh feed
    pub fn begin_initial(&mut self) -> Option<LoadTicket> {
        if self.loading || self.current_page > 0 || self.state != ScrollState::Idle {
            return None;
        }
        Some(self.issue(LoadKind::Initial))
    }

    /// Next page, if the viewport is near the bottom and nothing else is loading
    pub fn begin_more(&mut self, metrics: &ScrollMetrics) -> Option<LoadTicket> {
        if self.loading || !self.has_more {
            return None;
        }
        if !matches!(self.state, ScrollState::Idle | ScrollState::Error) {
            return None;
        }
        if !metrics.is_near_bottom(self.scroll_threshold) {
            return None;
        }

        let kind = if self.current_page == 0 {
            LoadKind::Initial
        } else {
            LoadKind::More
        };
        Some(self.issue(kind))
    }

    /// Applies a load result. Returns false when the result was discarded
    /// because the feed was unmounted after the ticket was issued.
    pub fn complete(&mut self, ticket: LoadTicket, result: AppResult<MoviePage>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(page_num = ticket.page_num, "Discarding stale page load");
            return false;
        }

        self.loading = false;

        match result {
            Ok(page) => {
                let fetched = page.movies.len();
                self.movies.extend(page.movies);
                self.current_page = ticket.page_num;
                self.last_error = None;

                if fetched < self.page_size as usize {
                    self.has_more = false;
                    self.state = ScrollState::Exhausted;
                } else {
                    self.state = ScrollState::Idle;
                }

                tracing::info!(
                    page_num = ticket.page_num,
                    fetched = fetched,
                    loaded = self.movies.len(),
                    has_more = self.has_more,
                    initial = ticket.kind == LoadKind::Initial,
                    "Alphabetical page appended"
                );
                true
            }
            Err(AppError::Cancelled) => {
                self.state = ScrollState::Idle;
                false
            }
            Err(e) => {
                tracing::error!(page_num = ticket.page_num, error = %e, "Failed to load movies");
                self.last_error = Some(e.user_message());
                self.state = ScrollState::Error;
                true
            }
        }
    }

    /// Loads the first page
    pub async fn mount(&mut self) -> bool {
        let Some(ticket) = self.begin_initial() else {
            return false;
        };
        let result = self.loader().load(&ticket).await;
        self.complete(ticket, result)
    }

    /// Loads the next page if `metrics` calls for it; true when a load ran
    pub async fn on_scroll(&mut self, metrics: &ScrollMetrics) -> bool {
        let Some(ticket) = self.begin_more(metrics) else {
            return false;
        };
        let result = self.loader().load(&ticket).await;
        self.complete(ticket, result)
    }

    /// Cancels in-flight loads; results of earlier tickets are ignored
    pub fn unmount(&mut self) {
        self.scope.cancel();
        self.scope = FetchScope::new();
        self.generation += 1;
        self.loading = false;
        if matches!(self.state, ScrollState::LoadingInitial | ScrollState::LoadingMore) {
            self.state = ScrollState::Idle;
        }
    }
}
