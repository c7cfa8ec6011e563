//! Data models for Book Manager

pub mod author;
pub mod book;
pub mod publisher;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookMeta, BookStatus, BOOK_TYPE};
pub use publisher::Publisher;
pub use user::{Capability, Role, User, UserClaims};

/// Parse a request identifier; anything but a positive integer is `None`
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
