//! HTTP routes
//!
//! - GET /auth/steam/login    : redirect to Steam
//! - GET /auth/steam/callback : finish login, return a session token
//! - GET /auth/me             : verify a bearer token, return its claims
//! - GET /auth/health         : liveness
//! - GET /metrics             : Prometheus exposition

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use login::{AuthOrchestrator, LoginError};
use metrics_exporter_prometheus::PrometheusHandle;
use steam_auth::CallbackAssertion;
use tracing::{Instrument, info_span};

use crate::error::ApiError;
use crate::metrics;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthOrchestrator>,
    pub prometheus: PrometheusHandle,
}

/// Build the router. `max_connections` bounds concurrently handled requests.
pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/auth/steam/login", get(login_redirect))
        .route("/auth/steam/callback", get(steam_callback))
        .route("/auth/me", get(current_session))
        .route("/auth/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

async fn login_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(state.auth.login_url().as_str())
}

/// Steam redirects the user agent here with the OpenID assertion in the
/// query string. If the client goes away, the handler future is dropped and
/// any in-flight Steam call with it.
async fn steam_callback(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let request_id = new_request_id();
    let assertion = CallbackAssertion::from_query(query.as_deref().unwrap_or_default());
    let started = Instant::now();

    let result = state
        .auth
        .complete_login(&assertion)
        .instrument(info_span!("steam_callback", request_id = %request_id))
        .await;
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(session) => {
            metrics::record_login("success", elapsed);
            (StatusCode::OK, axum::Json(session)).into_response()
        }
        Err(e) => {
            let err = ApiError::new(e, request_id);
            metrics::record_login(err.error_type(), elapsed);
            err.into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

async fn current_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let verdict = bearer_token(&headers)
        .ok_or(LoginError::InvalidToken)
        .and_then(|token| state.auth.authenticate(token));

    match verdict {
        Ok(claims) => {
            metrics::record_token_check("valid");
            (StatusCode::OK, axum::Json(claims)).into_response()
        }
        Err(e) => {
            metrics::record_token_check("invalid");
            ApiError::new(e, new_request_id()).into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "status": "healthy",
            "service": "auth",
            "providers": [steam_auth::PROVIDER],
        })
        .to_string(),
    )
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}
