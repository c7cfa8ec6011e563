//! User model, roles, capabilities and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// User role (stored as its slug)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Editor,
    Author,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Editor => "editor",
            Role::Author => "author",
        }
    }

    /// Whether this role grants `cap`
    pub fn has_cap(&self, cap: Capability) -> bool {
        match self {
            Role::Administrator => true,
            Role::Editor => matches!(cap, Capability::EditBooks | Capability::EditOthersBooks),
            Role::Author => matches!(cap, Capability::EditBooks),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrator" => Ok(Role::Administrator),
            "editor" => Ok(Role::Editor),
            "author" => Ok(Role::Author),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Administrative actions a role may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Manage authors and publishers
    ManageOptions,
    /// Create books and edit one's own
    EditBooks,
    /// Edit and list books created by other users
    EditOthersBooks,
    ListUsers,
    CreateUsers,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageOptions => "manage_options",
            Capability::EditBooks => "edit_books",
            Capability::EditOthersBooks => "edit_others_books",
            Capability::ListUsers => "list_users",
            Capability::CreateUsers => "create_users",
        }
    }
}

/// Full user record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub login: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Login must be at least 3 characters"))]
    pub login: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub display_name: Option<String>,
    pub role: Role,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn can(&self, cap: Capability) -> bool {
        self.role.has_cap(cap)
    }

    /// Capability check; failure is a blocking "Unauthorized"
    pub fn require(&self, cap: Capability) -> Result<(), AppError> {
        if self.can(cap) {
            Ok(())
        } else {
            tracing::warn!(user_id = self.user_id, capability = cap.as_str(), "Capability check failed");
            Err(AppError::Authorization("Unauthorized".to_string()))
        }
    }

    /// Edit capability on a specific book, given its creator
    pub fn can_edit_book(&self, created_by: Option<i64>) -> bool {
        self.can(Capability::EditOthersBooks)
            || (self.can(Capability::EditBooks) && created_by == Some(self.user_id))
    }

    pub fn require_edit_book(&self, created_by: Option<i64>) -> Result<(), AppError> {
        if self.can_edit_book(created_by) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Sorry, you are not allowed to edit this book.".to_string(),
            ))
        }
    }

    /// Ownership filter for book listings: `None` means every book is visible
    pub fn book_owner_filter(&self) -> Option<i64> {
        if self.can(Capability::EditOthersBooks) {
            None
        } else {
            Some(self.user_id)
        }
    }
}
