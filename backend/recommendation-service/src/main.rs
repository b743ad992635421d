use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_service::config::Config;
use recommendation_service::db::{
    PgContentResolver, PgInteractionStore, PgMetadataStore, PgPreferenceStore,
};
use recommendation_service::handlers::{configure, RecommendationHandlerState};
use recommendation_service::services::RecommendationEngine;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        "Starting {} v{}",
        config.app.service_name,
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    let engine = Arc::new(RecommendationEngine::new(
        Arc::new(PgMetadataStore::new(db_pool.clone())),
        Arc::new(PgPreferenceStore::new(db_pool.clone())),
        Arc::new(PgInteractionStore::new(db_pool.clone())),
        Arc::new(PgContentResolver::new(db_pool.clone())),
        &config.recommendation,
    ));
    tracing::info!(
        related_overfetch = config.recommendation.related_overfetch_factor,
        personalized_overfetch = config.recommendation.personalized_overfetch_factor,
        "Recommendation engine initialized"
    );

    let handler_state = web::Data::new(RecommendationHandlerState {
        engine,
        config: config.recommendation.clone(),
    });

    let bind_addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("HTTP server listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(handler_state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
