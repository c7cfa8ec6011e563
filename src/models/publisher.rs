//! Publisher model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::sanitize;

/// Publisher record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherFields {
    pub name: String,
    pub address: String,
    pub website: String,
}

/// Raw publisher form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublisherForm {
    /// Row being edited; empty on add
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "_wpnonce")]
    pub nonce: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
}

impl PublisherForm {
    pub fn sanitize(&self) -> PublisherFields {
        PublisherFields {
            name: sanitize::text_field(&self.name),
            address: sanitize::textarea_field(&self.address),
            website: sanitize::url_raw(&self.website),
        }
    }
}
