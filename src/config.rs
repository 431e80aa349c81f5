use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::services::infinite_scroll::RetryPolicy;
use crate::services::ranking::{MeanScope, RankingParams, TrendingDedup};

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog backend base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Page size for listing, search and infinite scroll
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// How many movies the home feed pulls before ranking
    #[serde(default = "default_home_catalog_size")]
    pub home_catalog_size: u32,

    #[serde(default = "default_ranking_batch_size")]
    pub ranking_batch_size: usize,

    /// Prior weight `m` of the weighted rating
    #[serde(default = "default_smoothing_weight")]
    pub smoothing_weight: f64,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub mean_scope: MeanScope,

    #[serde(default)]
    pub trending_dedup: TrendingDedup,

    /// Distance from the document bottom that triggers the next page
    #[serde(default = "default_scroll_threshold_px")]
    pub scroll_threshold_px: f64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Ratings cache entry lifetime; unset keeps entries for the whole session
    #[serde(default)]
    pub ratings_cache_ttl_secs: Option<u64>,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    20
}

fn default_home_catalog_size() -> u32 {
    200
}

fn default_ranking_batch_size() -> usize {
    20
}

fn default_smoothing_weight() -> f64 {
    3.0
}

fn default_top_n() -> usize {
    10
}

fn default_scroll_threshold_px() -> f64 {
    50.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
            home_catalog_size: default_home_catalog_size(),
            ranking_batch_size: default_ranking_batch_size(),
            smoothing_weight: default_smoothing_weight(),
            top_n: default_top_n(),
            mean_scope: MeanScope::default(),
            trending_dedup: TrendingDedup::default(),
            scroll_threshold_px: default_scroll_threshold_px(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            ratings_cache_ttl_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall paging or ranking
    pub fn validate(&self) -> AppResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(AppError::Config("api_url cannot be empty".to_string()));
        }
        if self.page_size == 0 || self.home_catalog_size == 0 {
            return Err(AppError::Config(
                "page_size and home_catalog_size must be positive".to_string(),
            ));
        }
        if self.ranking_batch_size == 0 || self.top_n == 0 {
            return Err(AppError::Config(
                "ranking_batch_size and top_n must be positive".to_string(),
            ));
        }
        if !self.smoothing_weight.is_finite() || self.smoothing_weight < 0.0 {
            return Err(AppError::Config(
                "smoothing_weight must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn ratings_cache_ttl(&self) -> Option<chrono::Duration> {
        self.ratings_cache_ttl_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }

    pub fn ranking_params(&self) -> RankingParams {
        RankingParams {
            smoothing_weight: self.smoothing_weight,
            batch_size: self.ranking_batch_size,
            top_n: self.top_n,
            mean_scope: self.mean_scope,
            trending_dedup: self.trending_dedup,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.ranking_batch_size, 20);
        assert_eq!(config.smoothing_weight, 3.0);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.mean_scope, MeanScope::PerBatch);
        assert_eq!(config.trending_dedup, TrendingDedup::Off);
        assert_eq!(config.scroll_threshold_px, 50.0);
        assert!(config.ratings_cache_ttl().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = from_pairs(&[
            ("API_URL", "https://movies.example.com"),
            ("PAGE_SIZE", "12"),
            ("MEAN_SCOPE", "global"),
            ("TRENDING_DEDUP", "by_show_id"),
            ("RATINGS_CACHE_TTL_SECS", "600"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://movies.example.com");
        assert_eq!(config.page_size, 12);
        assert_eq!(config.mean_scope, MeanScope::Global);
        assert_eq!(config.trending_dedup, TrendingDedup::ByShowId);
        assert_eq!(config.ratings_cache_ttl(), Some(chrono::Duration::seconds(600)));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_ranking_params_follow_config() {
        let config = Config {
            smoothing_weight: 5.0,
            top_n: 3,
            ..Config::default()
        };
        let params = config.ranking_params();
        assert_eq!(params.smoothing_weight, 5.0);
        assert_eq!(params.top_n, 3);
        assert_eq!(params.batch_size, 20);
    }
}
