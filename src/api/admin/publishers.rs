//! Publisher management screen

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
        book::EMPTY_CELL,
        parse_id,
        publisher::{Publisher, PublisherForm},
        Capability, UserClaims,
    },
    AppState,
};

use super::{render_admin, swallow_storage_error, DeleteForm, PageQuery, PageState};

const LIST_URL: &str = "/admin/publishers";

impl NonceCarrier for PublisherForm {
    fn nonce(&self) -> &str {
        &self.nonce
    }
}

pub struct AddPublisher;

impl GuardedAction for AddPublisher {
    type Form = PublisherForm;
    const CAPABILITY: Capability = Capability::ManageOptions;

    fn nonce_action(_: &PublisherForm) -> String {
        "add_publisher".to_string()
    }
}

pub struct EditPublisher;

impl GuardedAction for EditPublisher {
    type Form = PublisherForm;
    const CAPABILITY: Capability = Capability::ManageOptions;

    fn nonce_action(_: &PublisherForm) -> String {
        "edit_publisher".to_string()
    }
}

pub struct DeletePublisher;

impl GuardedAction for DeletePublisher {
    type Form = DeleteForm;
    const CAPABILITY: Capability = Capability::ManageOptions;

    fn nonce_action(form: &DeleteForm) -> String {
        form.scope("delete_publisher")
    }
}

#[derive(Serialize)]
struct PublisherRow {
    #[serde(flatten)]
    publisher: Publisher,
    delete_nonce: String,
}

#[derive(Serialize)]
struct ListPage {
    rows: Vec<PublisherRow>,
    empty_cell: &'static str,
}

#[derive(Serialize, Default)]
struct FormValues {
    id: Option<i64>,
    name: String,
    address: String,
    website: String,
}

impl From<&Publisher> for FormValues {
    fn from(publisher: &Publisher) -> Self {
        Self {
            id: Some(publisher.id),
            name: publisher.name.clone(),
            address: publisher.address.clone().unwrap_or_default(),
            website: publisher.website.clone().unwrap_or_default(),
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
    AppError::NotFound("Publisher not found.".to_string())
}

/// `GET /admin/publishers?action=list|add|edit&id=..&message=..`
pub async fn page(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
    Query(query): Query<PageQuery>,
) -> PageResult<Html<String>> {
    claims.require(Capability::ManageOptions)?;

    match query.state() {
        PageState::List => list(&state, &claims, query.notice()).await,
        PageState::Add => form(&state, &claims, None).await,
        PageState::Edit(None) => Err(not_found().into()),
        PageState::Edit(Some(id)) => {
            let publisher = state.services.publishers.get_required(id).await?;
            form(&state, &claims, Some(&publisher)).await
        }
    }
}

async fn list(state: &AppState, claims: &UserClaims, notice: Option<&'static str>) -> PageResult<Html<String>> {
    let mut rows = Vec::new();
    for publisher in state.services.publishers.list().await? {
        let scope = format!("delete_publisher_{}", publisher.id);
        let delete_nonce = state.services.nonces.create(claims.user_id, &scope).await?;
        rows.push(PublisherRow { publisher, delete_nonce });
    }

    let page = ListPage {
        rows,
        empty_cell: EMPTY_CELL,
    };
    render_admin(state, claims, "admin/publishers_list.html", notice, page).await
}

async fn form(state: &AppState, claims: &UserClaims, publisher: Option<&Publisher>) -> PageResult<Html<String>> {
    let nonces = &state.services.nonces;
    let page = match publisher {
        Some(publisher) => FormPage {
            heading: "Edit Publisher",
            action: "/admin/publishers/edit",
            submit_label: "Update Publisher",
            nonce: nonces.create(claims.user_id, "edit_publisher").await?,
            form: publisher.into(),
        },
        None => FormPage {
            heading: "Add New Publisher",
            action: "/admin/publishers/add",
            submit_label: "Add Publisher",
            nonce: nonces.create(claims.user_id, "add_publisher").await?,
            form: FormValues::default(),
        },
    };

    render_admin(state, claims, "admin/publisher_form.html", None, page).await
}

/// `POST /admin/publishers/add`
pub async fn add(State(state): State<AppState>, guarded: Guarded<AddPublisher>) -> PageResult<Redirect> {
    let result = state.services.publishers.create(&guarded.form.sanitize()).await;
    swallow_storage_error(result, "publishers.add")?;
    Ok(Redirect::to(&format!("{}?message=added", LIST_URL)))
}

/// `POST /admin/publishers/edit`
pub async fn edit(State(state): State<AppState>, guarded: Guarded<EditPublisher>) -> PageResult<Redirect> {
    let id = parse_id(&guarded.form.id).ok_or_else(not_found)?;
    state.services.publishers.get_required(id).await?;

    let result = state.services.publishers.update(id, &guarded.form.sanitize()).await;
    swallow_storage_error(result, "publishers.edit")?;
    Ok(Redirect::to(&format!("{}?message=updated", LIST_URL)))
}

/// `POST /admin/publishers/delete`
pub async fn delete(State(state): State<AppState>, guarded: Guarded<DeletePublisher>) -> PageResult<Redirect> {
    if let Some(id) = parse_id(&guarded.form.id) {
        let result = state.services.publishers.delete(id).await;
        swallow_storage_error(result, "publishers.delete")?;
    } else {
        tracing::warn!(id = %guarded.form.id, "Ignoring delete with invalid publisher id");
    }
    Ok(Redirect::to(&format!("{}?message=deleted", LIST_URL)))
}
