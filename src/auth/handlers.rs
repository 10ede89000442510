//! Axum handlers for the session endpoints.
//!
//! Bodies are read as raw bytes and handed to [`BodyFields`]; nothing
//! here deserializes JSON. Successful responses use the
//! `{"success": true, "data": ...}` envelope and failures come from
//! [`AuthError`]'s `IntoResponse`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use super::request::{
    refresh_token, LoginRequest, NotificationUpdate, PasswordChange, ProfileUpdate,
    RegisterRequest,
};
use super::store::{AuthUser, LoginGrant, NotificationSettings, RefreshGrant};
use crate::error::AuthError;
use crate::json_field::BodyFields;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Serializes as `{}`.
#[derive(Debug, Serialize)]
pub struct Empty {}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

fn authorization(headers: &HeaderMap) -> Option<&[u8]> {
    headers.get(AUTHORIZATION).map(axum::http::HeaderValue::as_bytes)
}

/// Join `prefix` and `path` without doubling the slash.
#[must_use]
pub fn join_route(prefix: &str, path: &str) -> String {
    format!("{}{path}", prefix.trim_end_matches('/'))
}

/// Auth routes mounted under `prefix` (for example `/api/auth`).
pub fn routes(prefix: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(&join_route(prefix, "/login"), post(login))
        .route(&join_route(prefix, "/register"), post(register))
        .route(&join_route(prefix, "/refresh"), post(refresh))
        .route(&join_route(prefix, "/logout"), post(logout))
        .route(&join_route(prefix, "/me"), get(me))
        .route(&join_route(prefix, "/profile"), put(update_profile))
        .route(&join_route(prefix, "/password"), put(update_password))
        .route(&join_route(prefix, "/notifications"), put(update_notifications))
        .route(&join_route(prefix, "/account"), delete(delete_account))
}

pub async fn login(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Envelope<LoginGrant>> {
    let body = String::from_utf8_lossy(&body);
    let grant = state.auth.login(LoginRequest::from_fields(BodyFields::new(&body)));
    tracing::info!(username = %grant.user.username, "login");
    ok(grant)
}

pub async fn register(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Envelope<AuthUser>> {
    let body = String::from_utf8_lossy(&body);
    let user = state
        .auth
        .register(RegisterRequest::from_fields(BodyFields::new(&body)));
    tracing::info!(username = %user.username, "register");
    ok(user)
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Envelope<RefreshGrant>>, AuthError> {
    let body = String::from_utf8_lossy(&body);
    let token = refresh_token(BodyFields::new(&body));
    state.auth.refresh(&token).map(ok).inspect_err(|_| {
        tracing::warn!("refresh rejected");
    })
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Json<Envelope<Empty>> {
    state.auth.logout();
    ok(Empty {})
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Envelope<AuthUser>>, AuthError> {
    state.auth.me(authorization(&headers)).map(ok)
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Envelope<AuthUser>>, AuthError> {
    let body = String::from_utf8_lossy(&body);
    let update = ProfileUpdate::from_fields(BodyFields::new(&body));
    state
        .auth
        .update_profile(authorization(&headers), update)
        .map(ok)
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Envelope<Empty>>, AuthError> {
    let body = String::from_utf8_lossy(&body);
    let change = PasswordChange::from_fields(BodyFields::new(&body));
    state
        .auth
        .update_password(authorization(&headers), &change)
        .map(|()| ok(Empty {}))
}

pub async fn update_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Envelope<NotificationSettings>>, AuthError> {
    let body = String::from_utf8_lossy(&body);
    let update = NotificationUpdate::from_fields(BodyFields::new(&body));
    state
        .auth
        .update_notifications(authorization(&headers), update)
        .map(ok)
}

pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Envelope<Empty>>, AuthError> {
    state.auth.delete_account(authorization(&headers))?;
    tracing::warn!("account deleted, session tokens revoked");
    Ok(ok(Empty {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_route_handles_trailing_slash() {
        assert_eq!(join_route("/api/auth", "/me"), "/api/auth/me");
        assert_eq!(join_route("/api/auth/", "/me"), "/api/auth/me");
        assert_eq!(join_route("/", "/me"), "/me");
    }

    #[test]
    fn empty_serializes_as_object() {
        let value = serde_json::to_value(Envelope {
            success: true,
            data: Empty {},
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": {}}));
    }
}
