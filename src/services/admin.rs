use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, ShowId},
    services::backend::CatalogBackend,
    session::Session,
};

/// Catalog management for signed-in administrators
#[derive(Clone)]
pub struct AdminService {
    backend: Arc<dyn CatalogBackend>,
    session: Session,
}

impl AdminService {
    pub fn new(backend: Arc<dyn CatalogBackend>, session: Session) -> Self {
        Self { backend, session }
    }

    pub async fn add_movie(&self, movie: &Movie) -> AppResult<Movie> {
        validate_movie(movie)?;
        self.require_token().await?;
        self.backend.add_movie(movie).await
    }

    pub async fn update_movie(&self, movie: &Movie) -> AppResult<Movie> {
        validate_movie(movie)?;
        self.require_token().await?;
        let stored = self.backend.update_movie(movie).await?;
        self.session.invalidate_rating(&stored.show_id).await;
        Ok(stored)
    }

    pub async fn delete_movie(&self, show_id: &ShowId) -> AppResult<()> {
        validate_show_id(show_id)?;
        self.require_token().await?;
        self.backend.delete_movie(show_id).await?;
        self.session.invalidate_rating(show_id).await;
        Ok(())
    }

    async fn require_token(&self) -> AppResult<()> {
        match self.session.bearer_token().await {
            Some(_) => Ok(()),
            None => {
                tracing::warn!("Admin action attempted without a bearer token");
                Err(AppError::Unauthorized(
                    "Admin actions require a signed-in administrator".to_string(),
                ))
            }
        }
    }
}

fn validate_show_id(show_id: &ShowId) -> AppResult<()> {
    if show_id.as_str().trim().is_empty() {
        return Err(AppError::InvalidInput("Show ID is required".to_string()));
    }
    Ok(())
}

fn validate_movie(movie: &Movie) -> AppResult<()> {
    validate_show_id(&movie.show_id)?;
    if movie.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::MockCatalogBackend;
    use crate::session::SessionUser;

    async fn admin_session() -> Session {
        let session = Session::default();
        session
            .sign_in(SessionUser {
                user_id: 1,
                email: Some("admin@example.com".to_string()),
                token: Some("secret".to_string()),
            })
            .await;
        session
    }

    #[tokio::test]
    async fn test_add_movie_with_token() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_add_movie()
            .times(1)
            .returning(|movie| Ok(movie.clone()));

        let service = AdminService::new(Arc::new(mock), admin_session().await);
        let stored = service.add_movie(&Movie::new("s9", "New Film")).await.unwrap();

        assert_eq!(stored.title, "New Film");
    }

    #[tokio::test]
    async fn test_admin_actions_require_token() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_add_movie().never();
        mock.expect_delete_movie().never();

        let session = Session::default();
        session
            .sign_in(SessionUser {
                user_id: 2,
                email: None,
                token: None,
            })
            .await;
        let service = AdminService::new(Arc::new(mock), session);

        let result = service.add_movie(&Movie::new("s9", "New Film")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));

        let result = service.delete_movie(&ShowId::new("s9")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_before_backend() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_update_movie().never();
        mock.expect_delete_movie().never();

        let service = AdminService::new(Arc::new(mock), admin_session().await);

        let result = service.update_movie(&Movie::new("s1", "  ")).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let result = service.delete_movie(&ShowId::new(" ")).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_propagates_not_found() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_delete_movie()
            .returning(|id| Err(AppError::NotFound(format!("/AdminMovie/DeleteMovie/{}", id))));

        let service = AdminService::new(Arc::new(mock), admin_session().await);
        let result = service.delete_movie(&ShowId::new("s404")).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
