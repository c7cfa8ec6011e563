//! Public book pages and the panel fragment endpoint

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};
use minijinja::context;

use crate::{
    error::{AppError, AppResult, PageResult},
    models::{parse_id, BookStatus, BOOK_TYPE},
    views, AppState,
};

/// `GET /`
pub async fn home() -> Redirect {
    Redirect::to(&format!("/{}", BOOK_TYPE.archive_slug))
}

/// `GET /books`: published books, newest first
pub async fn archive(State(state): State<AppState>) -> PageResult<Html<String>> {
    let books = state.services.books.published().await?;
    let html = views::render(
        "front/archive.html",
        context! { book_type => &BOOK_TYPE, books => books },
    )?;
    Ok(Html(html))
}

/// `GET /books/:id`: title, cover, information panel, then the content
pub async fn single(State(state): State<AppState>, Path(id): Path<String>) -> PageResult<Html<String>> {
    let book = match parse_id(&id) {
        Some(id) => state.services.books.get(id).await?,
        None => None,
    }
    .filter(|book| book.status == BookStatus::Publish)
    .ok_or_else(|| AppError::NotFound(BOOK_TYPE.labels.not_found.to_string()))?;

    let renderer = &state.services.renderer;
    let panel_html = renderer.panel(&book).await?;
    let content_html = renderer.content(&book).await?;

    let html = views::render(
        "front/single.html",
        context! {
            book_type => &BOOK_TYPE,
            book => &book,
            panel_html => panel_html,
            content_html => content_html,
        },
    )?;
    Ok(Html(html))
}

/// Panel fragment for a book, as the `[book_info id="N"]` macro renders it.
/// Anything that is not a book yields an empty body.
#[utoipa::path(
    get,
    path = "/books/{id}/info",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Rendered information panel", content_type = "text/html", body = String)
    )
)]
pub async fn book_info(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Html<String>> {
    match parse_id(&id) {
        Some(id) => Ok(Html(state.services.renderer.book_info(id).await?)),
        None => Ok(Html(String::new())),
    }
}
