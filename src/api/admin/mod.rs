//! Admin screens: author and publisher management, the book list and
//! editor, and the search endpoints used by those screens.

pub mod ajax;
pub mod authors;
pub mod books;
pub mod publishers;

use axum::response::Html;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult, PageResult},
    models::{book::ContentType, parse_id, Capability, UserClaims, BOOK_TYPE},
    services::nonces::AJAX_ACTION,
    views, AppState,
};

use super::guard::NonceCarrier;

/// Query string of an entity management page
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub action: Option<String>,
    pub id: Option<String>,
    pub message: Option<String>,
}

/// Which view of an entity management page to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    List,
    Add,
    /// Edit form; `None` when the id is missing or not a number
    Edit(Option<i64>),
}

impl PageQuery {
    pub fn state(&self) -> PageState {
        match self.action.as_deref() {
            Some("add") => PageState::Add,
            Some("edit") => PageState::Edit(self.id.as_deref().and_then(parse_id)),
            _ => PageState::List,
        }
    }

    pub fn notice(&self) -> Option<&'static str> {
        notice(self.message.as_deref())
    }
}

/// Transient success notice for a redirect's `message` code
pub fn notice(code: Option<&str>) -> Option<&'static str> {
    match code? {
        "added" => Some("Item added successfully."),
        "updated" => Some("Item updated successfully."),
        "deleted" => Some("Item deleted successfully."),
        _ => None,
    }
}

/// Delete button submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "_wpnonce")]
    pub nonce: String,
}

impl NonceCarrier for DeleteForm {
    fn nonce(&self) -> &str {
        &self.nonce
    }
}

impl DeleteForm {
    /// Token scope binding a delete to its target row
    pub fn scope(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.id.trim())
    }
}

/// Admin writes report storage failures in the log only; the caller
/// redirects with its success message either way.
pub fn swallow_storage_error<T>(result: AppResult<T>, operation: &str) -> AppResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AppError::Database(e)) => {
            tracing::error!(operation, error = %e, "Storage write failed");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[derive(Serialize)]
struct FrameUser {
    login: String,
}

/// Context shared by every admin page
#[derive(Serialize)]
struct AdminFrame<T: Serialize> {
    user: FrameUser,
    /// Shared token for search requests, exposed in a `<meta>` tag
    ajax_nonce: String,
    book_type: &'static ContentType,
    can_manage: bool,
    notice: Option<&'static str>,
    #[serde(flatten)]
    page: T,
}

/// Render an admin template inside the common frame
pub async fn render_admin<T: Serialize>(
    state: &AppState,
    claims: &UserClaims,
    template: &str,
    notice: Option<&'static str>,
    page: T,
) -> PageResult<Html<String>> {
    let ajax_nonce = state.services.nonces.create(claims.user_id, AJAX_ACTION).await?;

    let frame = AdminFrame {
        user: FrameUser {
            login: claims.sub.clone(),
        },
        ajax_nonce,
        book_type: &BOOK_TYPE,
        can_manage: claims.can(Capability::ManageOptions),
        notice,
        page,
    };

    Ok(Html(views::render(template, &frame)?))
}
