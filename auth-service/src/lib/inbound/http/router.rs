use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::MakeRequestUuid;
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::request_id::SetRequestIdLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::confirm::confirm;
use super::handlers::get_user::get_user;
use super::handlers::login::login;
use super::handlers::refresh_confirm::refresh_confirm;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::service::AuthService;
use crate::outbound::cache::RedisTokenCache;
use crate::outbound::repositories::token::PostgresTokenRepository;
use crate::outbound::repositories::user::PostgresUserRepository;

#[derive(Clone)]
pub struct AppState {
    pub auth_service:
        Arc<AuthService<PostgresUserRepository, PostgresTokenRepository, RedisTokenCache>>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    auth_service: Arc<
        AuthService<PostgresUserRepository, PostgresTokenRepository, RedisTokenCache>,
    >,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        auth_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh-confirm/:user_id", post(refresh_confirm))
        .route("/api/auth/confirm/:user_id", get(confirm));

    let protected_routes = Router::new()
        .route("/api/users/:user_id", get(get_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                request_id = ?request.headers().get("x-request-id"),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
