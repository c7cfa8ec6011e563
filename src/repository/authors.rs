//! Authors table access

use crate::{
    error::AppResult,
    models::author::{Author, AuthorFields},
};

use super::Repository;

impl Repository {
    /// List all authors, name ascending
    pub async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get author by ID
    pub async fn authors_get(&self, id: i64) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert an author and return its identifier
    pub async fn authors_insert(&self, fields: &AuthorFields) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO authors (name, bio, image_url)
            VALUES ($1, NULLIF($2, ''), NULLIF($3, ''))
            RETURNING id
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.bio)
        .bind(&fields.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Update an author; `false` when no row has this ID
    pub async fn authors_update(&self, id: i64, fields: &AuthorFields) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE authors
            SET name = $1, bio = NULLIF($2, ''), image_url = NULLIF($3, ''), updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.bio)
        .bind(&fields.image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an author; referencing books lose their author
    pub async fn authors_delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
