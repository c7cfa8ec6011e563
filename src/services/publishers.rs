//! Publishers service

use crate::{
    error::{AppError, AppResult},
    models::publisher::{Publisher, PublisherFields},
    repository::Repository,
};

use super::search::filter_by_name;

#[derive(Clone)]
pub struct PublishersService {
    repository: Repository,
}

impl PublishersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Publisher>> {
        self.repository.publishers_list().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<Publisher>> {
        self.repository.publishers_get(id).await
    }

    pub async fn get_required(&self, id: i64) -> AppResult<Publisher> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Publisher not found.".to_string()))
    }

    /// Insert a publisher and return the new identifier
    pub async fn create(&self, fields: &PublisherFields) -> AppResult<i64> {
        let id = self.repository.publishers_insert(fields).await?;
        tracing::info!(publisher_id = id, name = %fields.name, "Publisher added");
        Ok(id)
    }

    pub async fn update(&self, id: i64, fields: &PublisherFields) -> AppResult<bool> {
        let updated = self.repository.publishers_update(id, fields).await?;
        if !updated {
            tracing::warn!(publisher_id = id, "Publisher update matched no row");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let deleted = self.repository.publishers_delete(id).await?;
        if !deleted {
            tracing::warn!(publisher_id = id, "Publisher delete matched no row");
        }
        Ok(deleted)
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<Publisher>> {
        Ok(filter_by_name(self.list().await?, query))
    }
}
