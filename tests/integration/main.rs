//! Integration tests
//!
//! Tests touching the database use `#[sqlx::test]` and need `DATABASE_URL`;
//! live-server tests need a running instance. Both are ignored by default:
//! run them with `cargo test -- --ignored`.

mod admin_tests;
mod repository_tests;
mod router_tests;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
};
use chrono::Utc;
use sqlx::PgPool;

use book_manager_server::{
    config::AppConfig,
    models::user::{CreateUser, Role, User, UserClaims},
    repository::Repository,
    services::{
        nonces::{MemoryTokenStore, NonceService},
        Services,
    },
    AppState,
};

pub fn app_state(pool: PgPool) -> AppState {
    let config = AppConfig::default();
    let nonces = NonceService::new(Arc::new(MemoryTokenStore::new()), 3600);
    let services = Services::new(Repository::new(pool), config.auth.clone(), nonces);

    AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }
}

/// Signed session token for a user that need not exist in the database
pub fn token_for(state: &AppState, user_id: i64, role: Role) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: format!("user{}", user_id),
        user_id,
        role,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&state.config.auth.jwt_secret)
    .unwrap()
}

/// Insert a user and return it with a session token
pub async fn create_user(state: &AppState, login: &str, role: Role) -> (User, String) {
    let user = state
        .services
        .users
        .create_user(CreateUser {
            login: login.to_string(),
            password: "correct horse battery".to_string(),
            display_name: None,
            role,
        })
        .await
        .unwrap();
    let token = state.services.users.create_token_for_user(&user).unwrap();
    (user, token)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("book_manager_token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("book_manager_token={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}
