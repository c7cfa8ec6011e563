//! HTTP handlers for the Book Manager admin, front-end pages and JSON API

pub mod admin;
pub mod auth;
pub mod front;
pub mod guard;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult, PageError},
    models::{user::UserClaims, BOOK_TYPE},
    AppState,
};

/// Cookie carrying the session token for HTML pages
pub const SESSION_COOKIE: &str = "book_manager_token";

/// Session token from the `Authorization: Bearer` header, or else the
/// session cookie
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

fn claims_from_parts(parts: &Parts, state: &AppState) -> AppResult<UserClaims> {
    let token = session_token(parts)
        .ok_or_else(|| AppError::Authentication("Missing authorization".to_string()))?;

    UserClaims::from_token(&token, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Authentication(e.to_string()))
}

/// Extractor for authenticated user from JWT token (JSON endpoints)
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(AuthenticatedUser(claims_from_parts(parts, state)?))
    }
}

/// Extractor for the logged-in user of an HTML page. Without a valid
/// session the request is sent to the login form.
pub struct SessionUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(SessionUser(claims_from_parts(parts, state)?))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/books/:id/info", get(front::book_info));

    // Admin screens and their form targets
    let admin = Router::new()
        .route("/authors", get(admin::authors::page))
        .route("/authors/add", post(admin::authors::add))
        .route("/authors/edit", post(admin::authors::edit))
        .route("/authors/delete", post(admin::authors::delete))
        .route("/publishers", get(admin::publishers::page))
        .route("/publishers/add", post(admin::publishers::add))
        .route("/publishers/edit", post(admin::publishers::edit))
        .route("/publishers/delete", post(admin::publishers::delete))
        .route("/books", get(admin::books::list).post(admin::books::create))
        .route("/books/new", get(admin::books::new_form))
        .route("/books/delete", post(admin::books::delete))
        .route("/books/:id", post(admin::books::save))
        .route("/books/:id/edit", get(admin::books::edit_form))
        .route("/ajax/search-authors", post(admin::ajax::search_authors))
        .route("/ajax/search-publishers", post(admin::ajax::search_publishers));

    let archive = format!("/{}", BOOK_TYPE.archive_slug);
    let single = format!("/{}/:id", BOOK_TYPE.archive_slug);

    Router::new()
        .route("/", get(front::home))
        .route("/login", get(auth::login_page).post(auth::login_form))
        .route("/logout", post(auth::logout))
        .route(&archive, get(front::archive))
        .route(&single, get(front::single))
        .nest("/admin", admin)
        .nest("/api/v1", api_v1)
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
