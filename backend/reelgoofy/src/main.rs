use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelgoofy::config::Config;
use reelgoofy::handlers;
use reelgoofy::services::{RecommendationService, ReviewIndex};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.app.default_filter())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting reelgoofy v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // The review index is the sole shared mutable resource; created once
    // and handed to every collaborator by reference.
    let index = Arc::new(ReviewIndex::new());
    let engine = RecommendationService::new(index.clone());

    let index_data = web::Data::new(index);
    let engine_data = web::Data::new(engine);

    let hostname = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("Listening on {hostname}");

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(handlers::json_config())
            .app_data(index_data.clone())
            .app_data(engine_data.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            .configure(handlers::configure)
    })
    .bind(hostname)?
    .run()
    .await
}
