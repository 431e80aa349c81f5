use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::cache::RatingsCache;
use crate::models::{RatingInfo, ShowId};

/// The signed-in user as established by the backend's auth flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub email: Option<String>,
    /// Bearer token for admin endpoints
    pub token: Option<String>,
}

/// Session-scoped client state
///
/// Created at application start and cleared on sign-out. Cloning yields a
/// handle to the same state.
#[derive(Clone, Debug)]
pub struct Session {
    inner: Arc<RwLock<SessionInner>>,
}

/// Inner state that can be modified
#[derive(Debug)]
pub struct SessionInner {
    pub user: Option<SessionUser>,
    pub ratings: RatingsCache,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Session {
    /// Creates an anonymous session with an empty ratings cache
    pub fn new(ratings_ttl: Option<chrono::Duration>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                user: None,
                ratings: RatingsCache::new(ratings_ttl),
            })),
        }
    }

    pub async fn sign_in(&self, user: SessionUser) {
        tracing::info!(user_id = user.user_id, "Session signed in");
        self.inner.write().await.user = Some(user);
    }

    /// Drops the user and everything cached on their behalf
    pub async fn sign_out(&self) {
        let mut inner = self.inner.write().await;
        let cached = inner.ratings.len();
        inner.user = None;
        inner.ratings.clear();
        tracing::info!(cleared_ratings = cached, "Session signed out");
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.inner.read().await.user.clone()
    }

    pub async fn user_id(&self) -> Option<i64> {
        self.inner.read().await.user.as_ref().map(|u| u.user_id)
    }

    pub async fn bearer_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .user
            .as_ref()
            .and_then(|u| u.token.clone())
    }

    /// Cached aggregates for `show_ids`, plus the IDs that still need fetching
    pub async fn cached_ratings(
        &self,
        show_ids: &[ShowId],
    ) -> (HashMap<ShowId, RatingInfo>, Vec<ShowId>) {
        self.inner.read().await.ratings.partition(show_ids, Utc::now())
    }

    pub async fn store_ratings(&self, ratings: &HashMap<ShowId, RatingInfo>) {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        for (show_id, info) in ratings {
            inner.ratings.insert(show_id.clone(), *info, now);
        }
    }

    pub async fn invalidate_rating(&self, show_id: &ShowId) {
        self.inner.write().await.ratings.invalidate(show_id);
    }

    pub async fn cached_rating_count(&self) -> usize {
        self.inner.read().await.ratings.len()
    }
}
