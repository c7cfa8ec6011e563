//! Input sanitation and small text helpers shared by forms and templates

use minijinja::HtmlEscape;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("TAG_RE is valid"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE_RE is valid"));
static URL_JUNK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\s<>"'`\\^{}|]"#).expect("URL_JUNK_RE is valid"));

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Sanitize a single-line text input: strip tags, collapse whitespace
/// (including line breaks and tabs) and trim.
pub fn text_field(input: &str) -> String {
    let stripped = TAG_RE.replace_all(input, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Sanitize a multi-line text input: strip tags but keep line breaks.
pub fn textarea_field(input: &str) -> String {
    let stripped = TAG_RE.replace_all(input, "");
    stripped
        .replace("\r\n", "\n")
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Clean a URL for storage. Only http(s) URLs survive; a bare host gets
/// `http://` prepended; anything else becomes the empty string.
pub fn url_raw(input: &str) -> String {
    let cleaned = URL_JUNK_RE.replace_all(input.trim(), "").to_string();
    if cleaned.is_empty() {
        return cleaned;
    }

    match cleaned.split_once("://") {
        Some((scheme, rest)) => {
            let scheme = scheme.to_ascii_lowercase();
            if ALLOWED_SCHEMES.contains(&scheme.as_str()) && !rest.is_empty() {
                format!("{}://{}", scheme, rest)
            } else {
                String::new()
            }
        }
        // "javascript:alert(1)", "mailto:x" and friends
        None if cleaned.contains(':') && !cleaned.contains('.') => String::new(),
        None if cleaned.starts_with('/') => String::new(),
        None => format!("http://{}", cleaned),
    }
}

/// Sanitize an optional single-line field, mapping empty results to `None`.
pub fn optional_text(input: Option<&str>) -> Option<String> {
    input.map(text_field).filter(|s| !s.is_empty())
}

/// Keep the first `count` words of `text`, appending an ellipsis when cut.
pub fn trim_words(text: &str, count: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= count {
        words.join(" ")
    } else {
        format!("{}\u{2026}", words[..count].join(" "))
    }
}

/// Escape `text` and turn line breaks into `<br>` tags.
pub fn nl2br(text: &str) -> String {
    HtmlEscape(text)
        .to_string()
        .replace("\r\n", "\n")
        .replace('\n', "<br>\n")
}
