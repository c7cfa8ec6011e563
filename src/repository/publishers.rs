//! Publishers table access

use crate::{
    error::AppResult,
    models::publisher::{Publisher, PublisherFields},
};

use super::Repository;

impl Repository {
    /// List all publishers, name ascending
    pub async fn publishers_list(&self) -> AppResult<Vec<Publisher>> {
        let rows = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get publisher by ID
    pub async fn publishers_get(&self, id: i64) -> AppResult<Option<Publisher>> {
        let row = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a publisher and return its identifier
    pub async fn publishers_insert(&self, fields: &PublisherFields) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO publishers (name, address, website)
            VALUES ($1, NULLIF($2, ''), NULLIF($3, ''))
            RETURNING id
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.website)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Update a publisher; `false` when no row has this ID
    pub async fn publishers_update(&self, id: i64, fields: &PublisherFields) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE publishers
            SET name = $1, address = NULLIF($2, ''), website = NULLIF($3, ''), updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.website)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a publisher; referencing books lose their publisher
    pub async fn publishers_delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
