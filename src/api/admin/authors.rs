//! Author management screen

use axum::{
    extract::{Query, State},
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
        author::{Author, AuthorForm},
        parse_id, Capability, UserClaims,
    },
    AppState,
};

use super::{render_admin, swallow_storage_error, DeleteForm, PageQuery, PageState};

const LIST_URL: &str = "/admin/authors";

impl NonceCarrier for AuthorForm {
    fn nonce(&self) -> &str {
        &self.nonce
    }
}

pub struct AddAuthor;

impl GuardedAction for AddAuthor {
    type Form = AuthorForm;
    const CAPABILITY: Capability = Capability::ManageOptions;

    fn nonce_action(_: &AuthorForm) -> String {
        "add_author".to_string()
    }
}

pub struct EditAuthor;

impl GuardedAction for EditAuthor {
    type Form = AuthorForm;
    const CAPABILITY: Capability = Capability::ManageOptions;

    fn nonce_action(_: &AuthorForm) -> String {
        "edit_author".to_string()
    }
}

pub struct DeleteAuthor;

impl GuardedAction for DeleteAuthor {
    type Form = DeleteForm;
    const CAPABILITY: Capability = Capability::ManageOptions;

    fn nonce_action(form: &DeleteForm) -> String {
        form.scope("delete_author")
    }
}

#[derive(Serialize)]
struct AuthorRow {
    #[serde(flatten)]
    author: Author,
    delete_nonce: String,
}

#[derive(Serialize)]
struct ListPage {
    rows: Vec<AuthorRow>,
}

/// Field values shown in the add/edit form
#[derive(Serialize, Default)]
struct FormValues {
    id: Option<i64>,
    name: String,
    bio: String,
    image_url: String,
}

impl From<&Author> for FormValues {
    fn from(author: &Author) -> Self {
        Self {
            id: Some(author.id),
            name: author.name.clone(),
            bio: author.bio.clone().unwrap_or_default(),
            image_url: author.image_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct FormPage {
    heading: &'static str,
    action: &'static str,
    submit_label: &'static str,
    nonce: String,
    form: FormValues,
}

fn not_found() -> AppError {
    AppError::NotFound("Author not found.".to_string())
}

/// `GET /admin/authors?action=list|add|edit&id=..&message=..`
pub async fn page(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
    Query(query): Query<PageQuery>,
) -> PageResult<Html<String>> {
    claims.require(Capability::ManageOptions)?;

    match query.state() {
        PageState::List => list(&state, &claims, query.notice()).await,
        PageState::Add => form(&state, &claims, None).await,
        PageState::Edit(id) => {
            let id = id.ok_or_else(not_found)?;
            let author = state.services.authors.get_required(id).await?;
            form(&state, &claims, Some(&author)).await
        }
    }
}

async fn list(state: &AppState, claims: &UserClaims, notice: Option<&'static str>) -> PageResult<Html<String>> {
    let authors = state.services.authors.list().await?;

    let mut rows = Vec::with_capacity(authors.len());
    for author in authors {
        let delete_nonce = state
            .services
            .nonces
            .create(claims.user_id, &format!("delete_author_{}", author.id))
            .await?;
        rows.push(AuthorRow { author, delete_nonce });
    }

    render_admin(state, claims, "admin/authors_list.html", notice, ListPage { rows }).await
}

async fn form(state: &AppState, claims: &UserClaims, author: Option<&Author>) -> PageResult<Html<String>> {
    let page = match author {
        Some(author) => FormPage {
            heading: "Edit Author",
            action: "/admin/authors/edit",
            submit_label: "Update Author",
            nonce: state.services.nonces.create(claims.user_id, "edit_author").await?,
            form: FormValues::from(author),
        },
        None => FormPage {
            heading: "Add New Author",
            action: "/admin/authors/add",
            submit_label: "Add Author",
            nonce: state.services.nonces.create(claims.user_id, "add_author").await?,
            form: FormValues::default(),
        },
    };

    render_admin(state, claims, "admin/author_form.html", None, page).await
}

/// `POST /admin/authors/add`
pub async fn add(State(state): State<AppState>, guarded: Guarded<AddAuthor>) -> PageResult<Redirect> {
    let result = state.services.authors.create(&guarded.form.sanitize()).await;
    swallow_storage_error(result, "authors.add")?;
    Ok(Redirect::to(&format!("{}?message=added", LIST_URL)))
}

/// `POST /admin/authors/edit`
pub async fn edit(State(state): State<AppState>, guarded: Guarded<EditAuthor>) -> PageResult<Redirect> {
    let id = parse_id(&guarded.form.id).ok_or_else(not_found)?;
    state.services.authors.get_required(id).await?;

    let result = state.services.authors.update(id, &guarded.form.sanitize()).await;
    swallow_storage_error(result, "authors.edit")?;
    Ok(Redirect::to(&format!("{}?message=updated", LIST_URL)))
}

/// `POST /admin/authors/delete`
pub async fn delete(State(state): State<AppState>, guarded: Guarded<DeleteAuthor>) -> PageResult<Redirect> {
    match parse_id(&guarded.form.id) {
        Some(id) => {
            let result = state.services.authors.delete(id).await;
            swallow_storage_error(result, "authors.delete")?;
        }
        None => tracing::warn!(id = %guarded.form.id, "Ignoring delete with invalid author id"),
    }
    Ok(Redirect::to(&format!("{}?message=deleted", LIST_URL)))
}
