//! Authors service

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorFields},
    repository::Repository,
};

use super::search::filter_by_name;

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors_list().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<Author>> {
        self.repository.authors_get(id).await
    }

    /// Get an author that must exist
    pub async fn get_required(&self, id: i64) -> AppResult<Author> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found.".to_string()))
    }

    pub async fn create(&self, fields: &AuthorFields) -> AppResult<i64> {
        let id = self.repository.authors_insert(fields).await?;
        tracing::info!(author_id = id, name = %fields.name, "Author added");
        Ok(id)
    }

    /// Update an author. A write that matches no row is reported, not raised.
    pub async fn update(&self, id: i64, fields: &AuthorFields) -> AppResult<bool> {
        let updated = self.repository.authors_update(id, fields).await?;
        if updated {
            tracing::info!(author_id = id, "Author updated");
        } else {
            tracing::warn!(author_id = id, "Author update matched no row");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let deleted = self.repository.authors_delete(id).await?;
        if deleted {
            tracing::info!(author_id = id, "Author deleted");
        } else {
            tracing::warn!(author_id = id, "Author delete matched no row");
        }
        Ok(deleted)
    }

    /// Authors whose name contains `query`, in list order
    pub async fn search(&self, query: &str) -> AppResult<Vec<Author>> {
        Ok(filter_by_name(self.list().await?, query))
    }
}
