//! Book content type: registration descriptor, records and typed metadata

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};

use crate::sanitize;

/// Placeholder for list cells whose value is missing or no longer resolves
pub const EMPTY_CELL: &str = "\u{2014}";

/// Labels shown by admin and front-end pages for a content type
#[derive(Debug, Serialize)]
pub struct ContentTypeLabels {
    pub name: &'static str,
    pub singular_name: &'static str,
    pub add_new: &'static str,
    pub add_new_item: &'static str,
    pub edit_item: &'static str,
    pub view_item: &'static str,
    pub all_items: &'static str,
    pub search_items: &'static str,
    pub not_found: &'static str,
    pub featured_image: &'static str,
    pub archives: &'static str,
}

/// Columns of the admin book list, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListColumn {
    Title,
    Author,
    Publisher,
    Isbn,
    Price,
    Stock,
    AddedBy,
    Date,
}

impl ListColumn {
    pub fn label(&self) -> &'static str {
        match self {
            ListColumn::Title => "Title",
            ListColumn::Author => "Author",
            ListColumn::Publisher => "Publisher",
            ListColumn::Isbn => "ISBN",
            ListColumn::Price => "Price",
            ListColumn::Stock => "Stock",
            ListColumn::AddedBy => "Added By",
            ListColumn::Date => "Date",
        }
    }
}

/// Registration of a content type: what it is called, where its archive
/// lives and which list columns the admin shows.
#[derive(Debug, Serialize)]
pub struct ContentType {
    pub name: &'static str,
    pub labels: ContentTypeLabels,
    /// Public archive path segment
    pub archive_slug: &'static str,
    pub supports: &'static [&'static str],
    pub columns: &'static [ListColumn],
}

pub static BOOK_TYPE: ContentType = ContentType {
    name: "book",
    labels: ContentTypeLabels {
        name: "Books",
        singular_name: "Book",
        add_new: "Add New",
        add_new_item: "Add New Book",
        edit_item: "Edit Book",
        view_item: "View Book",
        all_items: "All Books",
        search_items: "Search Books",
        not_found: "No books found.",
        featured_image: "Book Cover",
        archives: "Book Archives",
    },
    archive_slug: "books",
    supports: &["title", "editor", "thumbnail", "excerpt"],
    columns: &[
        ListColumn::Title,
        ListColumn::Author,
        ListColumn::Publisher,
        ListColumn::Isbn,
        ListColumn::Price,
        ListColumn::Stock,
        ListColumn::AddedBy,
        ListColumn::Date,
    ],
};

/// Publication status of a book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Draft,
    Publish,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Draft => "draft",
            BookStatus::Publish => "publish",
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BookStatus::Draft),
            "publish" => Ok(BookStatus::Publish),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Typed metadata attached to a book
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BookMeta {
    pub author_id: Option<i64>,
    pub translator: Option<String>,
    pub publisher_id: Option<i64>,
    pub isbn: Option<String>,
    pub edition: Option<String>,
    pub price: Option<Decimal>,
    pub pages: Option<i32>,
    pub country: Option<String>,
    pub language: Option<String>,
    /// Free text, e.g. "June 2022"
    pub publication_date: Option<String>,
    pub stock_quantity: Option<i32>,
}

/// Core content fields of a book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookCore {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image_url: String,
    pub status: BookStatus,
}

/// Full book record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image_url: Option<String>,
    pub status: BookStatus,
    #[sqlx(flatten)]
    pub meta: BookMeta,
    /// User who created the book; never changes afterwards
    pub created_by: Option<i64>,
    /// User who last saved the metadata
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the admin book list, with referenced names resolved
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookListRow {
    pub id: i64,
    pub title: String,
    pub status: BookStatus,
    pub created_by: Option<i64>,
    pub author_name: Option<String>,
    pub publisher_name: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub added_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookListRow {
    /// Text shown in `column` for this row
    pub fn column_value(&self, column: ListColumn) -> String {
        fn or_dash(value: Option<String>) -> String {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| EMPTY_CELL.to_string())
        }

        match column {
            ListColumn::Title if self.title.is_empty() => "(no title)".to_string(),
            ListColumn::Title => self.title.clone(),
            ListColumn::Author => or_dash(self.author_name.clone()),
            ListColumn::Publisher => or_dash(self.publisher_name.clone()),
            ListColumn::Isbn => or_dash(self.isbn.clone()),
            ListColumn::Price => or_dash(self.price.map(|p| p.to_string())),
            ListColumn::Stock => or_dash(self.stock_quantity.map(|q| q.to_string())),
            ListColumn::AddedBy => or_dash(self.added_by_name.clone()),
            ListColumn::Date => self.created_at.format("%Y/%m/%d").to_string(),
        }
    }
}

/// Book listing filter
#[derive(Debug, Clone, Copy, Default)]
pub struct BookFilter {
    /// Restrict to books created by this user
    pub created_by: Option<i64>,
    pub status: Option<BookStatus>,
}

/// Raw book editor submission.
///
/// Metadata fields are optional: a field missing from the submission keeps
/// its stored value, a field sent empty clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    #[serde(default, rename = "_wpnonce")]
    pub nonce: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Set by the editor's periodic background save
    #[serde(default)]
    pub autosave: Option<String>,
    pub book_author_id: Option<String>,
    pub book_translator: Option<String>,
    pub book_publisher_id: Option<String>,
    pub book_isbn: Option<String>,
    pub book_edition: Option<String>,
    pub book_price: Option<String>,
    pub book_pages: Option<String>,
    pub book_country: Option<String>,
    pub book_language: Option<String>,
    pub book_publication_date: Option<String>,
    pub book_stock_quantity: Option<String>,
}

impl BookForm {
    pub fn is_autosave(&self) -> bool {
        matches!(self.autosave.as_deref(), Some("1") | Some("true"))
    }

    pub fn core(&self) -> BookCore {
        BookCore {
            title: sanitize::text_field(&self.title),
            content: self.content.replace("\r\n", "\n").trim().to_string(),
            excerpt: sanitize::textarea_field(&self.excerpt),
            cover_image_url: sanitize::url_raw(&self.cover_image_url),
            status: self
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Merge the submitted metadata over `current`, sanitizing text and
    /// coercing numbers to their declared types.
    pub fn apply_meta(&self, current: &BookMeta) -> BookMeta {
        fn text(field: &Option<String>, current: &Option<String>) -> Option<String> {
            match field {
                Some(raw) => sanitize::optional_text(Some(raw)),
                None => current.clone(),
            }
        }

        fn parsed<T: Copy>(
            field: &Option<String>,
            current: Option<T>,
            parse: impl Fn(&str) -> Option<T>,
        ) -> Option<T> {
            match field {
                Some(raw) => parse(&sanitize::text_field(raw)),
                None => current,
            }
        }

        BookMeta {
            author_id: parsed(&self.book_author_id, current.author_id, parse_reference),
            translator: text(&self.book_translator, &current.translator),
            publisher_id: parsed(&self.book_publisher_id, current.publisher_id, parse_reference),
            isbn: text(&self.book_isbn, &current.isbn),
            edition: text(&self.book_edition, &current.edition),
            price: parsed(&self.book_price, current.price, parse_price),
            pages: parsed(&self.book_pages, current.pages, |s| {
                s.parse::<i32>().ok().filter(|p| *p >= 1)
            }),
            country: text(&self.book_country, &current.country),
            language: text(&self.book_language, &current.language),
            publication_date: text(&self.book_publication_date, &current.publication_date),
            stock_quantity: parsed(&self.book_stock_quantity, current.stock_quantity, |s| {
                s.parse::<i32>().ok().filter(|q| *q >= 0)
            }),
        }
    }
}

fn parse_reference(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Exclusive upper bound of a `NUMERIC(10, 2)` price
const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

fn parse_price(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .ok()
        .filter(|p| !p.is_sign_negative())
        .map(|p| p.round_dp(2))
        .filter(|p| *p < PRICE_LIMIT)
}
