//! Books table access

use crate::{
    error::AppResult,
    models::book::{Book, BookCore, BookFilter, BookListRow, BookMeta, BookStatus},
};

use super::Repository;

impl Repository {
    /// List books for the admin table, newest first, with referenced names
    /// resolved. Dangling references come back as NULL names.
    pub async fn books_list(&self, filter: &BookFilter) -> AppResult<Vec<BookListRow>> {
        let rows = sqlx::query_as::<_, BookListRow>(
            r#"
            SELECT b.id, b.title, b.status, b.created_by,
                   a.name AS author_name,
                   p.name AS publisher_name,
                   b.isbn, b.price, b.stock_quantity,
                   u.display_name AS added_by_name,
                   b.created_at
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            LEFT JOIN publishers p ON p.id = b.publisher_id
            LEFT JOIN users u ON u.id = b.created_by
            WHERE ($1::BIGINT IS NULL OR b.created_by = $1)
              AND ($2::TEXT IS NULL OR b.status = $2)
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .bind(filter.created_by)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Published books for the public archive
    pub async fn books_published(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE status = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(BookStatus::Publish)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn books_get(&self, id: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a book, recording `user_id` as its creator
    pub async fn books_insert(&self, core: &BookCore, meta: &BookMeta, user_id: i64) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (
                title, content, excerpt, cover_image_url, status,
                author_id, translator, publisher_id, isbn, edition, price, pages,
                country, language, publication_date, stock_quantity,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, NULLIF($4, ''), $5,
                    $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16,
                    $17, $17)
            RETURNING id
            "#,
        )
        .bind(&core.title)
        .bind(&core.content)
        .bind(&core.excerpt)
        .bind(&core.cover_image_url)
        .bind(core.status)
        .bind(meta.author_id)
        .bind(&meta.translator)
        .bind(meta.publisher_id)
        .bind(&meta.isbn)
        .bind(&meta.edition)
        .bind(meta.price)
        .bind(meta.pages)
        .bind(&meta.country)
        .bind(&meta.language)
        .bind(&meta.publication_date)
        .bind(meta.stock_quantity)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Update the core fields of a book
    pub async fn books_update_core(&self, id: i64, core: &BookCore) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, content = $2, excerpt = $3, cover_image_url = NULLIF($4, ''),
                status = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&core.title)
        .bind(&core.content)
        .bind(&core.excerpt)
        .bind(&core.cover_image_url)
        .bind(core.status)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the metadata of a book, stamping `user_id` as its last editor.
    /// The creator is left untouched.
    pub async fn books_update_meta(&self, id: i64, meta: &BookMeta, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET author_id = $1, translator = $2, publisher_id = $3, isbn = $4,
                edition = $5, price = $6, pages = $7, country = $8, language = $9,
                publication_date = $10, stock_quantity = $11,
                updated_by = $12, updated_at = NOW()
            WHERE id = $13
            "#,
        )
        .bind(meta.author_id)
        .bind(&meta.translator)
        .bind(meta.publisher_id)
        .bind(&meta.isbn)
        .bind(&meta.edition)
        .bind(meta.price)
        .bind(meta.pages)
        .bind(&meta.country)
        .bind(&meta.language)
        .bind(&meta.publication_date)
        .bind(meta.stock_quantity)
        .bind(user_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a book
    pub async fn books_delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
