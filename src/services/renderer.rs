//! Front-end book information panel and the `[book_info]` content macro

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{parse_id, Author, Book, BookMeta, Publisher},
    repository::Repository,
    sanitize, views,
};

static BOOK_INFO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[book_info(?:\s+id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s\]]+)))?\s*\]"#).expect("BOOK_INFO_RE is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublisherInfo {
    pub address: Option<String>,
    pub website: Option<String>,
}

/// Read-only summary of a book's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookPanel {
    pub items: Vec<PanelItem>,
    pub author_bio: Option<String>,
    pub publisher_info: Option<PublisherInfo>,
}

impl BookPanel {
    /// Build the panel; empty fields and unresolved references are omitted
    pub fn assemble(meta: &BookMeta, author: Option<&Author>, publisher: Option<&Publisher>) -> Self {
        let mut items = Vec::new();
        let mut push = |label: &'static str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                items.push(PanelItem { label, value });
            }
        };

        push("Author", author.map(|a| a.name.clone()));
        push("Translator", meta.translator.clone());
        push("Publisher", publisher.map(|p| p.name.clone()));
        push("ISBN", meta.isbn.clone());
        push("Edition", meta.edition.clone());
        push("Publication Date", meta.publication_date.clone());
        push("Number of Pages", meta.pages.map(|p| p.to_string()));
        push("Language", meta.language.clone());
        push("Country", meta.country.clone());
        push("Price", meta.price.map(|p| p.to_string()));

        let author_bio = author
            .and_then(|a| a.bio.clone())
            .filter(|bio| !bio.trim().is_empty());

        let publisher_info = publisher.and_then(|p| {
            let address = p.address.clone().filter(|a| !a.trim().is_empty());
            let website = p.website.clone().filter(|w| !w.trim().is_empty());
            (address.is_some() || website.is_some()).then_some(PublisherInfo { address, website })
        });

        Self {
            items,
            author_bio,
            publisher_info,
        }
    }
}

/// Which book a `[book_info]` occurrence refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroTarget {
    /// No `id` attribute: the book being rendered
    Current,
    Id(i64),
    /// An `id` attribute that is not a valid identifier
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    BookInfo(MacroTarget),
}

/// Split content into plain text and `[book_info]` occurrences
pub fn parse_macros(content: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in BOOK_INFO_RE.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(&content[last..whole.start()]));
        }

        let raw_id = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3));
        let target = match raw_id {
            None => MacroTarget::Current,
            Some(m) => parse_id(m.as_str()).map_or(MacroTarget::Invalid, MacroTarget::Id),
        };
        segments.push(Segment::BookInfo(target));
        last = whole.end();
    }

    if last < content.len() {
        segments.push(Segment::Text(&content[last..]));
    }
    segments
}

#[derive(Clone)]
pub struct RendererService {
    repository: Repository,
}

impl RendererService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Resolve the book's references and assemble its panel
    pub async fn assemble(&self, book: &Book) -> AppResult<BookPanel> {
        let author = match book.meta.author_id {
            Some(id) => self.repository.authors_get(id).await?,
            None => None,
        };
        let publisher = match book.meta.publisher_id {
            Some(id) => self.repository.publishers_get(id).await?,
            None => None,
        };
        Ok(BookPanel::assemble(&book.meta, author.as_ref(), publisher.as_ref()))
    }

    /// Rendered panel HTML for `book`
    pub async fn panel(&self, book: &Book) -> AppResult<String> {
        let panel = self.assemble(book).await?;
        views::render_panel(&panel)
    }

    /// The `[book_info]` macro: panel HTML for `id`, or an empty string when
    /// `id` is not a book
    pub async fn book_info(&self, id: i64) -> AppResult<String> {
        match self.repository.books_get(id).await? {
            Some(book) => self.panel(&book).await,
            None => Ok(String::new()),
        }
    }

    /// Body HTML of `book`: text is escaped with line breaks kept, and
    /// `[book_info]` macros are expanded
    pub async fn content(&self, book: &Book) -> AppResult<String> {
        let mut html = String::new();
        for segment in parse_macros(&book.content) {
            match segment {
                Segment::Text(text) => html.push_str(&sanitize::nl2br(text)),
                Segment::BookInfo(MacroTarget::Current) => html.push_str(&self.panel(book).await?),
                Segment::BookInfo(MacroTarget::Id(id)) if id == book.id => {
                    html.push_str(&self.panel(book).await?)
                }
                Segment::BookInfo(MacroTarget::Id(id)) => html.push_str(&self.book_info(id).await?),
                Segment::BookInfo(MacroTarget::Invalid) => {}
            }
        }
        Ok(html)
    }
}
