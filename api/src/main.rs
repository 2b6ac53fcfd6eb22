//! MedHubb API Server
//!
//! Connects doctors and patients: authentication, role-based dashboards,
//! doctor approval by an administrator and patient-doctor connection invites.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    PostgresDoctorRepository, PostgresInviteRepository, PostgresPatientRepository,
    SupabaseAuthClient,
};
use app::{AdminService, AuthService, ConnectionService};
use auth::AdminPassword;
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub admin_service: Arc<AdminService>,
    pub connection_service: Arc<ConnectionService>,
    pub config: Config,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full router over the given state
pub fn build_router(state: AppState) -> Router {
    // Sign-in endpoints, rate limited per client IP.
    // PeerIpKeyExtractor reads the socket address, so the server must be
    // started with connect info.
    let mut rate_limited_routes = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/admin/login", post(handlers::admin_login));

    if let Some(governor_config) = GovernorConfigBuilder::default()
        .key_extractor(PeerIpKeyExtractor)
        .per_second(state.config.rate_limit_per_second)
        .burst_size(state.config.rate_limit_burst)
        .finish()
    {
        rate_limited_routes = rate_limited_routes.layer(GovernorLayer {
            config: Arc::new(governor_config),
        });
    } else {
        tracing::warn!("Rate limiting disabled");
    }

    // Routes for signed-in doctors and patients
    let session_routes = Router::new()
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        // Dashboards
        .route("/api/dashboard/doctor", get(handlers::doctor_dashboard))
        .route("/api/dashboard/patient", get(handlers::patient_dashboard))
        // Connections
        .route("/api/connections/doctors", get(handlers::list_doctors))
        .route("/api/connections/patients", get(handlers::list_patients))
        .route("/api/connections/invites", get(handlers::list_invites))
        .route(
            "/api/connections/invites/create",
            post(handlers::create_invite),
        )
        .route(
            "/api/connections/invites/:id/respond",
            post(handlers::respond_invite),
        )
        .route("/api/connections/invites/:id", delete(handlers::cancel_invite))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_middleware,
        ));

    // Administrator routes
    let admin_routes = Router::new()
        .route("/api/admin/doctors", get(handlers::admin_list_doctors))
        .route(
            "/api/admin/doctors/:id/approve",
            post(handlers::approve_doctor),
        )
        .route("/api/admin/doctors/:id/reject", post(handlers::reject_doctor))
        .route("/api/admin/stats", get(handlers::admin_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_middleware,
        ));

    let allow_origin = match state
        .config
        .cors_allowed_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };

    Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        // Public endpoints (session optional)
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/redirect", get(handlers::redirect))
        .merge(rate_limited_routes)
        .merge(session_routes)
        .merge(admin_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(allow_origin)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,medhubb_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MedHubb API...");

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Create adapters
    let doctor_repo = Arc::new(PostgresDoctorRepository::new(db.clone()));
    let patient_repo = Arc::new(PostgresPatientRepository::new(db.clone()));
    let invite_repo = Arc::new(PostgresInviteRepository::new(db.clone()));

    if !config.can_delete_accounts() {
        tracing::warn!(
            "SUPABASE_SERVICE_ROLE_KEY not set; accounts left behind by failed registrations will not be cleaned up"
        );
    }
    let auth_client = Arc::new(SupabaseAuthClient::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
        config.supabase_service_role_key.clone(),
    ));

    // Create application services
    let auth_service = Arc::new(AuthService::new(
        auth_client,
        doctor_repo.clone(),
        patient_repo.clone(),
    ));

    let admin_service = Arc::new(AdminService::new(
        doctor_repo.clone(),
        patient_repo.clone(),
        invite_repo.clone(),
        AdminPassword::new(&config.admin_password),
    ));

    let connection_service = Arc::new(ConnectionService::new(
        doctor_repo,
        patient_repo,
        invite_repo,
    ));

    // Create app state
    let state = AppState {
        auth_service,
        admin_service,
        connection_service,
        config: config.clone(),
    };

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
