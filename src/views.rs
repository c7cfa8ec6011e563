//! HTML rendering with embedded minijinja templates
//!
//! Templates live under `templates/` and are compiled into the binary. All
//! template names end in `.html`, so output is auto-escaped; fragments that
//! are already HTML go through the `safe` filter.

use minijinja::{context, Environment, HtmlEscape, Value};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::{error::AppResult, sanitize, services::renderer::BookPanel};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("admin/layout.html", include_str!("../templates/admin/layout.html")),
    ("admin/authors_list.html", include_str!("../templates/admin/authors_list.html")),
    ("admin/author_form.html", include_str!("../templates/admin/author_form.html")),
    ("admin/publishers_list.html", include_str!("../templates/admin/publishers_list.html")),
    ("admin/publisher_form.html", include_str!("../templates/admin/publisher_form.html")),
    ("admin/books_list.html", include_str!("../templates/admin/books_list.html")),
    ("admin/book_form.html", include_str!("../templates/admin/book_form.html")),
    ("front/panel.html", include_str!("../templates/front/panel.html")),
    ("front/single.html", include_str!("../templates/front/single.html")),
    ("front/archive.html", include_str!("../templates/front/archive.html")),
];

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to compile template {}: {:#}", name, e);
        }
    }
    env.add_filter("trim_words", trim_words_filter);
    env.add_filter("nl2br", nl2br_filter);
    env
});

/// Text of a template value; none and undefined render as nothing
fn text_of(value: &Value) -> String {
    if value.is_none() || value.is_undefined() {
        String::new()
    } else if let Some(s) = value.as_str() {
        s.to_string()
    } else {
        value.to_string()
    }
}

fn trim_words_filter(value: Value, count: Option<usize>) -> String {
    sanitize::trim_words(&text_of(&value), count.unwrap_or(55))
}

fn nl2br_filter(value: Value) -> Value {
    Value::from_safe_string(sanitize::nl2br(&text_of(&value)))
}

/// Render template `name` with `ctx`
pub fn render<S: Serialize>(name: &str, ctx: S) -> AppResult<String> {
    let template = ENV.get_template(name)?;
    Ok(template.render(ctx)?)
}

/// Book information panel fragment
pub fn render_panel(panel: &BookPanel) -> AppResult<String> {
    render("front/panel.html", context! { panel => panel })
}

/// Blocking error page. Never fails: a broken template degrades to a bare
/// escaped message.
pub fn render_error_page(title: &str, message: &str) -> String {
    render("error.html", context! { title => title, message => message }).unwrap_or_else(|e| {
        tracing::error!("Failed to render error page: {}", e);
        bare_error_page(title, message)
    })
}

fn bare_error_page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html><title>{0}</title><h1>{0}</h1><p>{1}</p>",
        HtmlEscape(title),
        HtmlEscape(message)
    )
}
