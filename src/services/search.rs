//! Name filtering for the search-as-you-type endpoints

use crate::{
    models::{Author, Publisher},
    sanitize,
};

/// A row that can be matched by name
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Author {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Publisher {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Keep the rows whose name contains `query`, ignoring case. The query is
/// sanitized first; an empty query keeps everything.
pub fn filter_by_name<T: Named>(rows: Vec<T>, query: &str) -> Vec<T> {
    let needle = sanitize::text_field(query).to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| row.name().to_lowercase().contains(&needle))
        .collect()
}
