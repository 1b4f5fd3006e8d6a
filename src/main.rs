use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellness_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::create_pool(&config).await?;
    db::run_migrations(&db).await?;
    tracing::info!("Database migrations applied");

    let rate_limiter = RateLimitState::default();
    rate_limiter.spawn_cleanup_worker();

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
    };

    let app = app(state)?;

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Client IP is needed for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn app(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        // Account
        .route(
            "/api/me",
            get(handlers::auth::me)
                .put(handlers::auth::update_me)
                .delete(handlers::auth::delete_me),
        )
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Check-ins
        .route(
            "/api/checkins",
            post(handlers::checkins::upsert_checkin)
                .get(handlers::checkins::list_checkins)
                .delete(handlers::checkins::clear_checkins),
        )
        .route(
            "/api/checkins/today",
            get(handlers::checkins::get_today_checkin),
        )
        .route(
            "/api/checkins/:date",
            get(handlers::checkins::get_checkin).delete(handlers::checkins::delete_checkin),
        )
        // Stats & calendar
        .route("/api/stats/streak", get(handlers::stats::get_streak))
        .route("/api/stats/trends", get(handlers::stats::get_trends))
        .route("/api/stats/summary", get(handlers::stats::get_summary))
        .route("/api/calendar", get(handlers::calendar::get_calendar))
        // Export
        .route("/api/export", get(handlers::export::export_checkins))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let origins = state
        .config
        .allowed_origins()
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true);

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
