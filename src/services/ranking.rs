use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

use crate::models::{Genre, Movie, RatingInfo, WeightedScore};

/// Which movies the prior mean `C` is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanScope {
    /// Mean of the scoring batch the movie falls in
    #[default]
    PerBatch,
    /// One mean over every movie being ranked
    Global,
}

/// Whether a movie listed under several genres may appear more than once in
/// the trending list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendingDedup {
    #[default]
    Off,
    ByShowId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingParams {
    /// Prior weight `m`
    pub smoothing_weight: f64,
    pub batch_size: usize,
    pub top_n: usize,
    pub mean_scope: MeanScope,
    pub trending_dedup: TrendingDedup,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            smoothing_weight: 3.0,
            batch_size: 20,
            top_n: 10,
            mean_scope: MeanScope::PerBatch,
            trending_dedup: TrendingDedup::Off,
        }
    }
}

/// Ranking input: a movie and its rating aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct RatedMovie {
    pub movie: Movie,
    pub rating: RatingInfo,
}

impl RatedMovie {
    pub fn new(movie: Movie, rating: RatingInfo) -> Self {
        Self { movie, rating }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    /// Top entries per genre; genres with no scored movie are absent
    pub by_genre: BTreeMap<Genre, Vec<WeightedScore>>,
    pub trending: Vec<WeightedScore>,
}

fn sanitized(average_rating: f64) -> f64 {
    if average_rating.is_finite() {
        average_rating
    } else {
        0.0
    }
}

/// Arithmetic mean of the average ratings in `batch`; 0 for an empty batch
pub fn batch_mean(batch: &[RatedMovie]) -> f64 {
    if batch.is_empty() {
        return 0.0;
    }
    let sum: f64 = batch
        .iter()
        .map(|entry| sanitized(entry.rating.average_rating))
        .sum();
    sum / batch.len() as f64
}

/// Smoothed rating `n/(n+m)·R + m/(n+m)·C`.
///
/// Few reviews pull the score toward `mean`; many reviews let the movie's own
/// average dominate.
pub fn weighted_rating(rating: RatingInfo, mean: f64, smoothing_weight: f64) -> f64 {
    let n = f64::from(rating.review_count);
    let m = smoothing_weight;
    if n + m == 0.0 {
        return mean;
    }
    let r = sanitized(rating.average_rating);
    (n / (n + m)) * r + (m / (n + m)) * mean
}

fn sort_descending(scores: &mut [WeightedScore]) {
    // stable: equal scores keep encounter order
    scores.sort_by(|a, b| b.weighted_rating.total_cmp(&a.weighted_rating));
}

/// Scores `rated` batch by batch and builds per-genre and trending top lists
pub fn rank(rated: &[RatedMovie], params: &RankingParams) -> Rankings {
    let batch_size = params.batch_size.max(1);
    let global_mean = batch_mean(rated);

    let mut buckets: BTreeMap<Genre, Vec<WeightedScore>> = BTreeMap::new();

    for (batch_index, batch) in rated.chunks(batch_size).enumerate() {
        let mean = match params.mean_scope {
            MeanScope::PerBatch => batch_mean(batch),
            MeanScope::Global => global_mean,
        };

        tracing::debug!(
            batch = batch_index,
            size = batch.len(),
            mean = mean,
            "Scoring ranking batch"
        );

        for entry in batch {
            let weighted = weighted_rating(entry.rating, mean, params.smoothing_weight);
            for genre in &entry.movie.genres {
                buckets.entry(*genre).or_default().push(WeightedScore {
                    movie: entry.movie.clone(),
                    weighted_rating: weighted,
                });
            }
        }
    }

    let mut trending: Vec<WeightedScore> = buckets.values().flatten().cloned().collect();
    sort_descending(&mut trending);
    if params.trending_dedup == TrendingDedup::ByShowId {
        let mut seen = HashSet::new();
        trending.retain(|score| seen.insert(score.movie.show_id.clone()));
    }
    trending.truncate(params.top_n);

    let by_genre = buckets
        .into_iter()
        .map(|(genre, mut scores)| {
            sort_descending(&mut scores);
            scores.truncate(params.top_n);
            (genre, scores)
        })
        .collect();

    Rankings { by_genre, trending }
}
