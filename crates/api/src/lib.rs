//! # Folio API
//!
//! The API crate provides the web server for Folio's authentication and
//! access-control subsystem. Content services elsewhere in the site call it
//! to log in, verify tokens and gate their mutations.
//!
//! ## Architecture
//!
//! - **Auth**: password hashing, token generation and the session logic
//! - **Routes**: API endpoints and URL structure
//! - **Handlers**: request processing
//! - **Middleware**: the bearer-token gate and error mapping
//! - **Config**: environment configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Credential checks, sessions and maintenance tasks
pub mod auth;
/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use eyre::Result;
use folio_core::clock::SystemClock;
use folio_db::{store::PgCredentialStore, DbPool};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth::{AuthService, PasswordHasher};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Login, session and gate operations over the credential store
    pub auth: AuthService,
}

/// Builds the router with every endpoint attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Authentication and account endpoints
        .merge(routes::auth::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Builds the authentication service over PostgreSQL from configuration.
pub fn build_auth_service(config: &config::AuthConfig, db_pool: DbPool) -> Result<AuthService> {
    let hasher = PasswordHasher::new(config.hash_params())?;

    Ok(AuthService::new(
        Arc::new(PgCredentialStore::new(db_pool)),
        hasher,
        Arc::new(SystemClock),
        config.policy()?,
    ))
}

/// Starts the API server with the provided configuration and database connection
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = folio_api::config::ApiConfig::from_env()?;
/// let db_pool = folio_db::create_pool(&config.database_url).await?;
/// folio_api::start_server(config, db_pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Create shared state with dependencies
    let auth = build_auth_service(&config.auth, db_pool)?;
    let state = Arc::new(ApiState { auth });

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect::<Vec<_>>();

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request tracing and timeout
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
