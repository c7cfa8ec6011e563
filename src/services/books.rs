//! Book records and the metadata editor's save path

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter, BookForm, BookListRow, BookMeta},
        Author, Publisher, UserClaims,
    },
    repository::Repository,
};

/// Everything the editor form needs besides the book itself
pub struct EditorChoices {
    pub authors: Vec<Author>,
    pub publishers: Vec<Publisher>,
}

/// Outcome of saving the editor form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Core fields and metadata written
    Saved,
    /// Autosave pass: core fields written, metadata left alone
    CoreOnly,
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Admin list, restricted to the user's own books unless they may edit
    /// everyone's
    pub async fn list_for(&self, claims: &UserClaims) -> AppResult<Vec<BookListRow>> {
        let filter = BookFilter {
            created_by: claims.book_owner_filter(),
            status: None,
        };
        self.repository.books_list(&filter).await
    }

    pub async fn published(&self) -> AppResult<Vec<Book>> {
        self.repository.books_published().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        self.repository.books_get(id).await
    }

    pub async fn get_required(&self, id: i64) -> AppResult<Book> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))
    }

    /// Load a book the user is allowed to edit
    pub async fn get_editable(&self, claims: &UserClaims, id: i64) -> AppResult<Book> {
        let book = self.get_required(id).await?;
        claims.require_edit_book(book.created_by)?;
        Ok(book)
    }

    /// Full author and publisher listings for the editor's pickers
    pub async fn editor_choices(&self) -> AppResult<EditorChoices> {
        Ok(EditorChoices {
            authors: self.repository.authors_list().await?,
            publishers: self.repository.publishers_list().await?,
        })
    }

    /// Create a book from the editor form; the acting user becomes its creator
    pub async fn create(&self, claims: &UserClaims, form: &BookForm) -> AppResult<i64> {
        let core = form.core();
        let meta = if form.is_autosave() {
            BookMeta::default()
        } else {
            self.resolve_references(form.apply_meta(&BookMeta::default())).await?
        };

        let id = self.repository.books_insert(&core, &meta, claims.user_id).await?;
        tracing::info!(book_id = id, user_id = claims.user_id, "Book added");
        Ok(id)
    }

    /// Save the editor form over an existing book.
    ///
    /// Autosave passes only write the core fields. Otherwise every submitted
    /// metadata field is written and the acting user is stamped as the last
    /// editor; the creator never changes.
    pub async fn save(&self, claims: &UserClaims, id: i64, form: &BookForm) -> AppResult<SaveOutcome> {
        let book = self.get_editable(claims, id).await?;

        self.repository.books_update_core(id, &form.core()).await?;
        if form.is_autosave() {
            tracing::debug!(book_id = id, "Autosave: metadata skipped");
            return Ok(SaveOutcome::CoreOnly);
        }

        let meta = self.resolve_references(form.apply_meta(&book.meta)).await?;
        self.repository.books_update_meta(id, &meta, claims.user_id).await?;
        tracing::info!(book_id = id, user_id = claims.user_id, "Book updated");
        Ok(SaveOutcome::Saved)
    }

    pub async fn delete(&self, claims: &UserClaims, id: i64) -> AppResult<bool> {
        self.get_editable(claims, id).await?;
        let deleted = self.repository.books_delete(id).await?;
        tracing::info!(book_id = id, user_id = claims.user_id, deleted, "Book deleted");
        Ok(deleted)
    }

    /// Drop author/publisher ids that no longer resolve (deleted between
    /// rendering the form and submitting it)
    async fn resolve_references(&self, mut meta: BookMeta) -> AppResult<BookMeta> {
        if let Some(author_id) = meta.author_id {
            if self.repository.authors_get(author_id).await?.is_none() {
                tracing::warn!(author_id, "Ignoring unknown author reference");
                meta.author_id = None;
            }
        }
        if let Some(publisher_id) = meta.publisher_id {
            if self.repository.publishers_get(publisher_id).await?.is_none() {
                tracing::warn!(publisher_id, "Ignoring unknown publisher reference");
                meta.publisher_id = None;
            }
        }
        Ok(meta)
    }
}
