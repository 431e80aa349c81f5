use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{models::Movie, services::backend::CatalogBackend};

/// Cheap string check: rejects posters that cannot possibly be real images
pub fn is_placeholder_poster(url: &str) -> bool {
    let url = url.trim();
    url.is_empty()
        || url == "null"
        || url == "undefined"
        || url.to_ascii_lowercase().contains("placeholder")
}

/// Two-stage poster check: string inspection first, then an image-load probe
/// only for URLs that survive it.
pub async fn poster_is_valid(backend: &dyn CatalogBackend, movie: &Movie) -> bool {
    let url = match movie.poster_url.as_deref() {
        Some(url) if !is_placeholder_poster(url) => url.trim(),
        _ => return false,
    };

    match backend.probe_image(url).await {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::debug!(show_id = %movie.show_id, error = %e, "Poster probe errored");
            false
        }
    }
}

/// Keeps the movies whose poster passes [`poster_is_valid`], in order
pub async fn retain_valid(backend: Arc<dyn CatalogBackend>, movies: Vec<Movie>) -> Vec<Movie> {
    let mut tasks = JoinSet::new();

    for (index, movie) in movies.into_iter().enumerate() {
        let backend = backend.clone();
        tasks.spawn(async move {
            let valid = poster_is_valid(backend.as_ref(), &movie).await;
            (index, movie, valid)
        });
    }

    let mut checked = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, movie, true)) => checked.push((index, movie)),
            Ok((_, movie, false)) => {
                tracing::debug!(show_id = %movie.show_id, "Dropping movie without a usable poster");
            }
            Err(e) => tracing::error!(error = %e, "Task join error"),
        }
    }

    checked.sort_by_key(|(index, _)| *index);
    checked.into_iter().map(|(_, movie)| movie).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::MockCatalogBackend;

    fn with_poster(id: &str, poster: Option<&str>) -> Movie {
        let mut movie = Movie::new(id, id);
        movie.poster_url = poster.map(str::to_string);
        movie
    }

    #[test]
    fn test_placeholder_strings() {
        assert!(is_placeholder_poster(""));
        assert!(is_placeholder_poster("   "));
        assert!(is_placeholder_poster("null"));
        assert!(is_placeholder_poster("undefined"));
        assert!(is_placeholder_poster("https://img.example.com/Placeholder.png"));
        assert!(!is_placeholder_poster("https://img.example.com/s1.jpg"));
    }

    #[tokio::test]
    async fn test_undefined_rejected_without_probe() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_probe_image().never();

        let movie = with_poster("s1", Some("undefined"));
        assert!(!poster_is_valid(&mock, &movie).await);
    }

    #[tokio::test]
    async fn test_missing_poster_rejected_without_probe() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_probe_image().never();

        assert!(!poster_is_valid(&mock, &with_poster("s1", None)).await);
    }

    #[tokio::test]
    async fn test_probe_decides_for_plausible_urls() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_probe_image()
            .returning(|url| Ok(url.ends_with("ok.jpg")));

        assert!(poster_is_valid(&mock, &with_poster("s1", Some("https://img.example.com/ok.jpg"))).await);
        assert!(!poster_is_valid(&mock, &with_poster("s2", Some("https://img.example.com/404.jpg"))).await);
    }

    #[tokio::test]
    async fn test_probe_error_counts_as_invalid() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_probe_image()
            .returning(|_| Err(crate::error::AppError::Internal("dns".to_string())));

        assert!(!poster_is_valid(&mock, &with_poster("s1", Some("https://img.example.com/a.jpg"))).await);
    }

    #[tokio::test]
    async fn test_retain_valid_preserves_order() {
        let mut mock = MockCatalogBackend::new();
        mock.expect_probe_image()
            .returning(|url| Ok(!url.contains("broken")));

        let movies = vec![
            with_poster("a", Some("https://img.example.com/a.jpg")),
            with_poster("b", Some("null")),
            with_poster("c", Some("https://img.example.com/broken.jpg")),
            with_poster("d", Some("https://img.example.com/d.jpg")),
        ];

        let valid = retain_valid(Arc::new(mock), movies).await;
        let ids: Vec<&str> = valid.iter().map(|m| m.show_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }
}
