use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{ShowId, SubmitRatingRequest},
    services::backend::CatalogBackend,
    session::Session,
};

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// Star ratings for the signed-in user
#[derive(Clone)]
pub struct RatingService {
    backend: Arc<dyn CatalogBackend>,
    session: Session,
}

impl RatingService {
    pub fn new(backend: Arc<dyn CatalogBackend>, session: Session) -> Self {
        Self { backend, session }
    }

    pub async fn submit_rating(&self, show_id: &ShowId, stars: u8) -> AppResult<()> {
        if !(MIN_STARS..=MAX_STARS).contains(&stars) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {} stars",
                MIN_STARS, MAX_STARS
            )));
        }

        let user_id = self.signed_in_user().await?;
        let request = SubmitRatingRequest {
            show_id: show_id.clone(),
            user_id,
            rating: stars,
        };
        self.backend.submit_rating(&request).await?;

        // the aggregate shown on the home page is now stale
        self.session.invalidate_rating(show_id).await;

        tracing::info!(show_id = %show_id, user_id = user_id, stars = stars, "Rating submitted");
        Ok(())
    }

    /// The signed-in user's rating for `show_id`, if any
    pub async fn user_rating(&self, show_id: &ShowId) -> AppResult<Option<u8>> {
        let user_id = self.signed_in_user().await?;
        self.backend.user_rating(show_id, user_id).await
    }

    async fn signed_in_user(&self) -> AppResult<i64> {
        self.session
            .user_id()
            .await
            .ok_or_else(|| AppError::Unauthorized("Sign in to rate movies".to_string()))
    }
}
