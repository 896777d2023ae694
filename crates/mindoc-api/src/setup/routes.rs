//! Route configuration and setup

use crate::auth::jwt::JwtService;
use crate::auth::middleware::AuthState;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Json, Router,
};
use mindoc_core::constants::API_PREFIX;
use mindoc_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = setup_auth_state(config);

    // Public routes (no authentication required)
    let public_routes = public_routes(state.clone());

    // Protected routes (require authentication)
    let protected_routes =
        protected_routes(state.clone()).layer(axum::middleware::from_fn_with_state(
            Arc::new(auth_state),
            crate::auth::middleware::auth_middleware,
        ));

    let app_state_routes = public_routes.merge(protected_routes);

    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = app_state_routes
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins().iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Setup authentication middleware state
fn setup_auth_state(config: &Config) -> AuthState {
    AuthState {
        jwt: JwtService::new(config.jwt_secret(), config.jwt_expiry_hours()),
    }
}

/// Public routes (no authentication required)
fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/auth/login", API_PREFIX),
            post(handlers::login::login),
        )
        .with_state(state)
        .route("/healthz", get(handlers::healthz))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Protected routes (require authentication).
fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(document_routes(state.clone()))
        .merge(permission_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(group_routes(state.clone()))
        .with_state(state)
}

/// Document routes
fn document_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/documents", API_PREFIX),
            post(handlers::document_upload::upload_document),
        )
        .route(
            &format!("{}/documents", API_PREFIX),
            get(handlers::document_get::list_documents),
        )
        .route(
            &format!("{}/documents/{{id}}", API_PREFIX),
            get(handlers::document_get::get_document),
        )
        .route(
            &format!("{}/documents/{{id}}/file", API_PREFIX),
            get(handlers::document_download::download_document),
        )
        .with_state(state)
}

/// Permission routes
fn permission_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/documents/{{id}}/permissions", API_PREFIX),
            post(handlers::permissions::grant_permission),
        )
        .route(
            &format!("{}/documents/{{id}}/permissions", API_PREFIX),
            delete(handlers::permissions::revoke_permission),
        )
        .with_state(state)
}

/// User administration routes
fn user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/users", API_PREFIX),
            post(handlers::users::create_user),
        )
        .route(
            &format!("{}/users", API_PREFIX),
            get(handlers::users::list_users),
        )
        .route(
            &format!("{}/users/{{id}}", API_PREFIX),
            get(handlers::users::get_user),
        )
        .route(
            &format!("{}/users/{{id}}/role", API_PREFIX),
            put(handlers::users::update_user_role),
        )
        .route(
            &format!("{}/users/{{id}}/password", API_PREFIX),
            put(handlers::users::update_user_password),
        )
        .route(
            &format!("{}/users/{{id}}", API_PREFIX),
            delete(handlers::users::delete_user),
        )
        .with_state(state)
}

/// Group administration routes
fn group_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/groups", API_PREFIX),
            post(handlers::groups::create_group),
        )
        .route(
            &format!("{}/groups", API_PREFIX),
            get(handlers::groups::list_groups),
        )
        .route(
            &format!("{}/groups/{{id}}", API_PREFIX),
            get(handlers::groups::get_group),
        )
        .route(
            &format!("{}/groups/{{id}}", API_PREFIX),
            delete(handlers::groups::delete_group),
        )
        .route(
            &format!("{}/groups/{{id}}/members", API_PREFIX),
            post(handlers::groups::add_group_member),
        )
        .route(
            &format!("{}/groups/{{id}}/members/{{user_id}}", API_PREFIX),
            delete(handlers::groups::remove_group_member),
        )
        .with_state(state)
}
