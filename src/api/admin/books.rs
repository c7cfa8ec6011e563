//! Book list and metadata editor

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Serialize;

use crate::{
    api::{
        guard::{Guarded, GuardedAction, NonceCarrier},
        SessionUser,
    },
    error::{AppError, PageResult},
    models::{
        book::{Book, BookForm, BookListRow, BookMeta, BookStatus, ListColumn},
        parse_id, Author, Capability, Publisher, UserClaims, BOOK_TYPE,
    },
    services::books::{EditorChoices, SaveOutcome},
    AppState,
};

use super::{notice, render_admin, swallow_storage_error, DeleteForm, PageQuery};

/// Token scope of the editor form; shared so background autosaves keep working
const EDITOR_ACTION: &str = "book_details";

impl NonceCarrier for BookForm {
    fn nonce(&self) -> &str {
        &self.nonce
    }
}

pub struct SaveBook;

impl GuardedAction for SaveBook {
    type Form = BookForm;
    const CAPABILITY: Capability = Capability::EditBooks;
    const SINGLE_USE: bool = false;

    fn nonce_action(_: &BookForm) -> String {
        EDITOR_ACTION.to_string()
    }
}

pub struct DeleteBook;

impl GuardedAction for DeleteBook {
    type Form = DeleteForm;
    const CAPABILITY: Capability = Capability::EditBooks;

    fn nonce_action(form: &DeleteForm) -> String {
        form.scope("delete_book")
    }
}

#[derive(Serialize)]
struct ColumnHeader {
    key: ListColumn,
    label: &'static str,
}

#[derive(Serialize)]
struct Cell {
    column: ListColumn,
    value: String,
}

#[derive(Serialize)]
struct BookRow {
    id: i64,
    status: BookStatus,
    cells: Vec<Cell>,
    delete_nonce: String,
}

impl BookRow {
    fn new(row: &BookListRow, delete_nonce: String) -> Self {
        let cells = BOOK_TYPE
            .columns
            .iter()
            .map(|&column| Cell {
                column,
                value: row.column_value(column),
            })
            .collect();

        Self {
            id: row.id,
            status: row.status,
            cells,
            delete_nonce,
        }
    }
}

#[derive(Serialize)]
struct ListPage {
    columns: Vec<ColumnHeader>,
    rows: Vec<BookRow>,
}

/// `GET /admin/books`
pub async fn list(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
    Query(query): Query<PageQuery>,
) -> PageResult<Html<String>> {
    claims.require(Capability::EditBooks)?;

    let books = state.services.books.list_for(&claims).await?;
    let mut rows = Vec::with_capacity(books.len());
    for book in &books {
        let delete_nonce = state
            .services
            .nonces
            .create(claims.user_id, &format!("delete_book_{}", book.id))
            .await?;
        rows.push(BookRow::new(book, delete_nonce));
    }

    let page = ListPage {
        columns: BOOK_TYPE
            .columns
            .iter()
            .map(|&key| ColumnHeader { key, label: key.label() })
            .collect(),
        rows,
    };
    render_admin(&state, &claims, "admin/books_list.html", query.notice(), page).await
}

#[derive(Serialize, Default)]
struct CoreValues {
    title: String,
    content: String,
    excerpt: String,
    cover_image_url: String,
    status: BookStatus,
}

/// Metadata as shown in the editor; numbers are rendered as text inputs
#[derive(Serialize, Default)]
struct MetaValues {
    author_id: Option<i64>,
    publisher_id: Option<i64>,
    translator: String,
    isbn: String,
    edition: String,
    price: String,
    pages: String,
    country: String,
    language: String,
    publication_date: String,
    stock_quantity: String,
}

impl From<&BookMeta> for MetaValues {
    fn from(meta: &BookMeta) -> Self {
        fn text<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        Self {
            author_id: meta.author_id,
            publisher_id: meta.publisher_id,
            translator: text(&meta.translator),
            isbn: text(&meta.isbn),
            edition: text(&meta.edition),
            price: text(&meta.price),
            pages: text(&meta.pages),
            country: text(&meta.country),
            language: text(&meta.language),
            publication_date: text(&meta.publication_date),
            stock_quantity: text(&meta.stock_quantity),
        }
    }
}

#[derive(Serialize)]
struct EditorPage {
    heading: &'static str,
    action: String,
    submit_label: &'static str,
    nonce: String,
    /// Background autosave only runs for existing books
    autosave: bool,
    book: CoreValues,
    meta: MetaValues,
    authors: Vec<Author>,
    publishers: Vec<Publisher>,
}

async fn editor(
    state: &AppState,
    claims: &UserClaims,
    book: Option<&Book>,
    notice: Option<&'static str>,
) -> PageResult<Html<String>> {
    let EditorChoices { authors, publishers } = state.services.books.editor_choices().await?;
    let nonce = state.services.nonces.create(claims.user_id, EDITOR_ACTION).await?;

    let page = match book {
        Some(book) => EditorPage {
            heading: BOOK_TYPE.labels.edit_item,
            action: format!("/admin/books/{}", book.id),
            submit_label: "Update",
            nonce,
            autosave: true,
            book: CoreValues {
                title: book.title.clone(),
                content: book.content.clone(),
                excerpt: book.excerpt.clone(),
                cover_image_url: book.cover_image_url.clone().unwrap_or_default(),
                status: book.status,
            },
            meta: MetaValues::from(&book.meta),
            authors,
            publishers,
        },
        None => EditorPage {
            heading: BOOK_TYPE.labels.add_new_item,
            action: "/admin/books".to_string(),
            submit_label: "Save",
            nonce,
            autosave: false,
            book: CoreValues::default(),
            meta: MetaValues::default(),
            authors,
            publishers,
        },
    };

    render_admin(state, claims, "admin/book_form.html", notice, page).await
}

/// `GET /admin/books/new`
pub async fn new_form(State(state): State<AppState>, SessionUser(claims): SessionUser) -> PageResult<Html<String>> {
    claims.require(Capability::EditBooks)?;
    editor(&state, &claims, None, None).await
}

/// `GET /admin/books/:id/edit`
pub async fn edit_form(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> PageResult<Html<String>> {
    claims.require(Capability::EditBooks)?;

    let id = parse_id(&id).ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;
    let book = state.services.books.get_editable(&claims, id).await?;
    editor(&state, &claims, Some(&book), notice(query.message.as_deref())).await
}

/// `POST /admin/books`
pub async fn create(State(state): State<AppState>, guarded: Guarded<SaveBook>) -> PageResult<Redirect> {
    let result = state.services.books.create(&guarded.claims, &guarded.form).await;
    match swallow_storage_error(result, "books.add")? {
        Some(id) => Ok(Redirect::to(&format!("/admin/books/{}/edit?message=added", id))),
        None => Ok(Redirect::to("/admin/books?message=added")),
    }
}

/// `POST /admin/books/:id`
pub async fn save(
    State(state): State<AppState>,
    Path(id): Path<String>,
    guarded: Guarded<SaveBook>,
) -> PageResult<Redirect> {
    let id = parse_id(&id).ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;

    let result = state.services.books.save(&guarded.claims, id, &guarded.form).await;
    let outcome = swallow_storage_error(result, "books.save")?;
    if outcome == Some(SaveOutcome::CoreOnly) {
        return Ok(Redirect::to(&format!("/admin/books/{}/edit", id)));
    }
    Ok(Redirect::to(&format!("/admin/books/{}/edit?message=updated", id)))
}

/// `POST /admin/books/delete`
pub async fn delete(State(state): State<AppState>, guarded: Guarded<DeleteBook>) -> PageResult<Redirect> {
    let Some(id) = parse_id(&guarded.form.id) else {
        tracing::warn!(id = %guarded.form.id, "Ignoring delete with invalid book id");
        return Ok(Redirect::to("/admin/books?message=deleted"));
    };

    match state.services.books.delete(&guarded.claims, id).await {
        Err(AppError::NotFound(_)) => tracing::warn!(book_id = id, "Book delete matched no row"),
        result => {
            swallow_storage_error(result, "books.delete")?;
        }
    }
    Ok(Redirect::to("/admin/books?message=deleted"))
}
