use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinema_client::{
    config::Config,
    services::{
        backend::{CatalogBackend, HttpBackend},
        catalog::CatalogService,
        home::HomeService,
        infinite_scroll::AlphabeticalFeed,
        scope::FetchScope,
    },
    session::Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(api_url = %config.api_url, "Starting catalog client");

    let session = Session::new(config.ratings_cache_ttl());
    let backend: Arc<dyn CatalogBackend> = Arc::new(HttpBackend::new(
        &config.api_url,
        config.request_timeout(),
        session.clone(),
    )?);
    let catalog = CatalogService::new(backend);

    let home = HomeService::new(
        catalog.clone(),
        session.clone(),
        config.ranking_params(),
        config.page_size,
        config.home_catalog_size,
    );
    let feed = home.build(&FetchScope::new()).await?;

    println!("Trending now");
    for (position, entry) in feed.trending.iter().enumerate() {
        println!(
            "{:>3}. {} ({:.2})",
            position + 1,
            entry.movie.title,
            entry.weighted_rating
        );
    }

    for (genre, entries) in &feed.by_genre {
        println!();
        println!("{}", genre);
        for entry in entries {
            println!("     {} ({:.2})", entry.movie.title, entry.weighted_rating);
        }
    }

    let mut browse = AlphabeticalFeed::new(
        catalog,
        config.page_size,
        config.scroll_threshold_px,
        config.retry_policy(),
    );
    browse.mount().await;
    match browse.last_error() {
        Some(message) => tracing::warn!(error = %message, "A-Z listing unavailable"),
        None => tracing::info!(
            loaded = browse.movies().len(),
            has_more = browse.has_more(),
            "A-Z listing ready"
        ),
    }

    Ok(())
}
