//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::PgStore, search::OpenLibrarySearchAdapter},
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler, signup_handler},
        books, library, middleware::require_auth, profile, rest::ApiDoc, state::AppState, words,
    },
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use wordshelf_core::{IdentityService, LibraryService};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Services & Adapters ---
    let library = LibraryService::new(store.clone());
    let identity = IdentityService::new(store);
    let search = Arc::new(OpenLibrarySearchAdapter::new(
        reqwest::Client::new(),
        config.open_library_url.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        library,
        identity,
        search,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("invalid ALLOWED_ORIGIN: {e}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/books/search", get(books::search_handler))
        .route("/books/recent", get(books::recent_books_handler))
        .route("/books/lookup", get(books::lookup_handler))
        .route("/books/{id}/words", get(books::book_words_handler))
        .route("/books/{id}/readers", get(books::book_readers_handler))
        .route("/profiles/{username}", get(profile::public_profile_handler))
        .route("/users/{id}/library", get(library::user_library_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/library", post(library::add_entry_handler))
        .route("/library", get(library::list_library_handler))
        .route("/library/{id}", get(library::get_entry_handler))
        .route("/library/{id}", delete(library::remove_entry_handler))
        .route("/library/{id}/status", put(library::update_status_handler))
        .route("/library/{id}/notes", put(library::update_notes_handler))
        .route("/library/{id}/words", get(words::entry_words_handler))
        .route("/words", post(words::add_word_handler))
        .route("/words/mine", get(words::my_words_handler))
        .route("/words/{id}", put(words::update_word_handler))
        .route("/words/{id}", delete(words::remove_word_handler))
        .route("/words/{id}/like", post(words::toggle_like_handler))
        .route("/me", get(profile::me_handler))
        .route("/me", put(profile::update_me_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
