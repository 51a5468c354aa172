//! Alexandria Server - Library Lending System

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alexandria_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("alexandria_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Alexandria Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.borrowing.clone(),
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication & accounts
        .route("/login/", post(api::auth::login))
        .route("/me/", get(api::auth::me))
        .route("/register/", post(api::users::register))
        .route("/user/:id/", get(api::users::get_user))
        .route("/user/:id/", put(api::users::update_user))
        .route("/user/:id/penalty/", get(api::users::get_penalty))
        // Categories
        .route("/categories/", get(api::categories::list_categories))
        .route("/categories/", post(api::categories::create_category))
        .route("/categories/:id/", get(api::categories::get_category))
        .route("/categories/:id/", put(api::categories::update_category))
        .route("/categories/:id/", delete(api::categories::delete_category))
        // Authors
        .route("/authors/", get(api::authors::list_authors))
        .route("/authors/", post(api::authors::create_author))
        .route("/authors/:id/", get(api::authors::get_author))
        .route("/authors/:id/", put(api::authors::update_author))
        .route("/authors/:id/", delete(api::authors::delete_author))
        // Books
        .route("/books/", get(api::books::list_books))
        .route("/books/", post(api::books::create_book))
        .route("/books/:id/", get(api::books::get_book))
        .route("/books/:id/", put(api::books::update_book))
        .route("/books/:id/", delete(api::books::delete_book))
        // Borrowing workflow
        .route("/borrow/", post(api::borrows::create_borrow))
        .route("/borrow/", get(api::borrows::list_borrows))
        .route("/borrow/return/", post(api::borrows::return_borrow))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api", api_routes)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
