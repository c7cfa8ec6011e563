//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::sanitize;

/// Author record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    /// Portrait image URL
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sanitized author fields, as written by insert and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorFields {
    pub name: String,
    pub bio: String,
    pub image_url: String,
}

/// Raw author form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorForm {
    /// Row being edited; empty on add
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "_wpnonce")]
    pub nonce: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: String,
}

impl AuthorForm {
    pub fn sanitize(&self) -> AuthorFields {
        AuthorFields {
            name: sanitize::text_field(&self.name),
            bio: sanitize::textarea_field(&self.bio),
            image_url: sanitize::url_raw(&self.image_url),
        }
    }
}
