//! Name search endpoints backing the author and publisher pickers

use axum::{extract::State, Form, Json};
use serde::Deserialize;

use crate::{
    api::AuthenticatedUser,
    error::AppResult,
    models::{Author, Publisher},
    services::nonces::AJAX_ACTION,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub nonce: String,
}

/// `POST /admin/ajax/search-authors`
pub async fn search_authors(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Form(form): Form<SearchForm>,
) -> AppResult<Json<Vec<Author>>> {
    state.services.nonces.verify(claims.user_id, AJAX_ACTION, &form.nonce).await?;

    let authors = state.services.authors.search(&form.search).await?;
    Ok(Json(authors))
}

/// `POST /admin/ajax/search-publishers`
pub async fn search_publishers(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Form(form): Form<SearchForm>,
) -> AppResult<Json<Vec<Publisher>>> {
    state.services.nonces.verify(claims.user_id, AJAX_ACTION, &form.nonce).await?;

    let publishers = state.services.publishers.search(&form.search).await?;
    Ok(Json(publishers))
}
