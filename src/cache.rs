use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::models::{RatingInfo, ShowId};

#[derive(Debug, Clone)]
struct CachedRating {
    info: RatingInfo,
    cached_at: DateTime<Utc>,
}

/// In-memory rating aggregates for one session
///
/// Entries never expire unless a TTL is configured; rating submissions
/// invalidate the affected entry explicitly.
#[derive(Debug, Clone, Default)]
pub struct RatingsCache {
    entries: HashMap<ShowId, CachedRating>,
    ttl: Option<Duration>,
}

impl RatingsCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CachedRating, now: DateTime<Utc>) -> bool {
        match self.ttl {
            Some(ttl) => now - entry.cached_at < ttl,
            None => true,
        }
    }

    /// Retrieves a cached aggregate if present and not expired
    pub fn get(&self, show_id: &ShowId, now: DateTime<Utc>) -> Option<RatingInfo> {
        self.entries
            .get(show_id)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.info)
    }

    /// Splits `show_ids` into cached aggregates and IDs that need a lookup
    pub fn partition(
        &self,
        show_ids: &[ShowId],
        now: DateTime<Utc>,
    ) -> (HashMap<ShowId, RatingInfo>, Vec<ShowId>) {
        let mut hits = HashMap::new();
        let mut misses = Vec::new();

        for show_id in show_ids {
            match self.get(show_id, now) {
                Some(info) => {
                    hits.insert(show_id.clone(), info);
                }
                None if !misses.contains(show_id) => misses.push(show_id.clone()),
                None => {}
            }
        }

        (hits, misses)
    }

    pub fn insert(&mut self, show_id: ShowId, info: RatingInfo, now: DateTime<Utc>) {
        self.entries.insert(
            show_id,
            CachedRating {
                info,
                cached_at: now,
            },
        );
    }

    pub fn invalidate(&mut self, show_id: &ShowId) {
        self.entries.remove(show_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
