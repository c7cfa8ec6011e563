//! Admin screens end to end, through the router and a real database

use axum::{body::Body, http::Request, http::StatusCode, response::Response};
use sqlx::PgPool;
use tower::ServiceExt;

use book_manager_server::{
    api::create_router,
    models::{
        author::AuthorFields,
        book::BookForm,
        publisher::PublisherFields,
        user::{Role, UserClaims},
    },
    services::nonces::AJAX_ACTION,
    AppState,
};

use super::{app_state, body_text, create_user, get, location, post_form};

async fn send(state: &AppState, request: Request<Body>) -> Response {
    create_router(state.clone()).oneshot(request).await.unwrap()
}

/// Value of the first hidden input named `name` in `html`
fn hidden_value(html: &str, name: &str) -> String {
    let marker = format!(r#"name="{}" value=""#, name);
    let start = html.find(&marker).expect("hidden input not found") + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}

fn claims(state: &AppState, token: &str) -> UserClaims {
    UserClaims::from_token(token, &state.config.auth.jwt_secret).unwrap()
}

async fn book_by(state: &AppState, token: &str, title: &str) -> i64 {
    let form = BookForm {
        title: title.to_string(),
        status: Some("publish".to_string()),
        ..Default::default()
    };
    state.services.books.create(&claims(state, token), &form).await.unwrap()
}

fn author(name: &str) -> AuthorFields {
    AuthorFields {
        name: name.to_string(),
        bio: String::new(),
        image_url: String::new(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn publisher_add_round_trip(pool: PgPool) {
    let state = app_state(pool);
    let (_, token) = create_user(&state, "admin", Role::Administrator).await;

    let form = send(&state, get("/admin/publishers?action=add", Some(&token))).await;
    assert_eq!(form.status(), StatusCode::OK);
    let nonce = hidden_value(&body_text(form).await, "_wpnonce");

    let body = format!("name=Penguin&address=&website=https%3A%2F%2Fpenguin.com&_wpnonce={}", nonce);
    let response = send(&state, post_form("/admin/publishers/add", Some(&token), &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/publishers?message=added");

    let list = send(&state, get("/admin/publishers?message=added", Some(&token))).await;
    let html = body_text(list).await;
    assert!(html.contains("Item added successfully."));
    assert!(html.contains("Penguin"));
    assert!(html.contains("penguin.com</a>"));

    // The add token was consumed
    let replay = send(&state, post_form("/admin/publishers/add", Some(&token), &body)).await;
    assert_eq!(replay.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.services.publishers.list().await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn replayed_delete_token_removes_nothing(pool: PgPool) {
    let state = app_state(pool);
    let (admin, token) = create_user(&state, "admin", Role::Administrator).await;
    let authors = &state.services.authors;

    let first = authors.create(&author("Ursula K. Le Guin")).await.unwrap();
    let nonce = state
        .services
        .nonces
        .create(admin.id, &format!("delete_author_{}", first))
        .await
        .unwrap();

    let body = format!("id={}&_wpnonce={}", first, nonce);
    let response = send(&state, post_form("/admin/authors/delete", Some(&token), &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/authors?message=deleted");
    assert!(authors.get(first).await.unwrap().is_none());

    let second = authors.create(&author("Octavia E. Butler")).await.unwrap();
    let body = format!("id={}&_wpnonce={}", second, nonce);
    let replay = send(&state, post_form("/admin/authors/delete", Some(&token), &body)).await;
    assert_eq!(replay.status(), StatusCode::FORBIDDEN);
    assert!(authors.get(second).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn editing_a_missing_author_changes_nothing(pool: PgPool) {
    let state = app_state(pool);
    let (admin, token) = create_user(&state, "admin", Role::Administrator).await;
    let existing = state.services.authors.create(&author("Mary Shelley")).await.unwrap();

    let nonce = state.services.nonces.create(admin.id, "edit_author").await.unwrap();
    let body = format!("id=999999&name=Changed&_wpnonce={}", nonce);
    let response = send(&state, post_form("/admin/authors/edit", Some(&token), &body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Author not found."));

    let stored = state.services.authors.get_required(existing).await.unwrap();
    assert_eq!(stored.name, "Mary Shelley");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn edit_page_needs_an_existing_id(pool: PgPool) {
    let state = app_state(pool);
    let (_, token) = create_user(&state, "admin", Role::Administrator).await;

    for uri in ["/admin/authors?action=edit&id=424242", "/admin/publishers?action=edit&id=abc"] {
        let response = send(&state, get(uri, Some(&token))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let fallback = send(&state, get("/admin/authors?action=bogus", Some(&token))).await;
    assert_eq!(fallback.status(), StatusCode::OK);
    assert!(body_text(fallback).await.contains("No authors found."));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn book_editor_flow(pool: PgPool) {
    let state = app_state(pool);
    let (_, token) = create_user(&state, "writer", Role::Author).await;

    let editor = send(&state, get("/admin/books/new", Some(&token))).await;
    assert_eq!(editor.status(), StatusCode::OK);
    let nonce = hidden_value(&body_text(editor).await, "_wpnonce");

    let body = format!(
        "title=Kindred&content=A+novel.&status=publish&book_isbn=978-0807083697&book_pages=264&_wpnonce={}",
        nonce
    );
    let created = send(&state, post_form("/admin/books", Some(&token), &body)).await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    let target = location(&created).to_string();
    assert!(target.ends_with("/edit?message=added"));
    let id: i64 = target
        .trim_start_matches("/admin/books/")
        .trim_end_matches("/edit?message=added")
        .parse()
        .unwrap();

    // The editor token is shared, so it saves again
    let body = format!("title=Kindred&status=publish&book_edition=25th+Anniversary&_wpnonce={}", nonce);
    let saved = send(&state, post_form(&format!("/admin/books/{}", id), Some(&token), &body)).await;
    assert_eq!(saved.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&saved), format!("/admin/books/{}/edit?message=updated", id));

    let page = send(&state, get(&format!("/books/{}", id), None)).await;
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    assert!(html.contains("Book Information"));
    assert!(html.contains("978-0807083697"));
    assert!(html.contains("25th Anniversary"));

    let list = send(&state, get("/admin/books", Some(&token))).await;
    assert!(body_text(list).await.contains("Kindred"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn drafts_are_not_public(pool: PgPool) {
    let state = app_state(pool);
    let (_, token) = create_user(&state, "writer", Role::Author).await;

    let editor = send(&state, get("/admin/books/new", Some(&token))).await;
    let nonce = hidden_value(&body_text(editor).await, "_wpnonce");
    let body = format!("title=Unfinished&status=draft&_wpnonce={}", nonce);
    let created = send(&state, post_form("/admin/books", Some(&token), &body)).await;
    let id = location(&created)
        .trim_start_matches("/admin/books/")
        .trim_end_matches("/edit?message=added")
        .to_string();

    let page = send(&state, get(&format!("/books/{}", id), None)).await;
    assert_eq!(page.status(), StatusCode::NOT_FOUND);

    let archive = send(&state, get("/books", None)).await;
    assert!(!body_text(archive).await.contains("Unfinished"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn failed_author_write_still_redirects_with_success(pool: PgPool) {
    let state = app_state(pool);
    let (admin, token) = create_user(&state, "admin", Role::Administrator).await;

    // Longer than the name column allows
    let name = "x".repeat(300);
    let nonce = state.services.nonces.create(admin.id, "add_author").await.unwrap();
    let body = format!("name={}&_wpnonce={}", name, nonce);
    let response = send(&state, post_form("/admin/authors/add", Some(&token), &body)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/authors?message=added");
    assert!(state.services.authors.list().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn failed_publisher_update_keeps_row_and_redirects(pool: PgPool) {
    let state = app_state(pool);
    let (admin, token) = create_user(&state, "admin", Role::Administrator).await;
    let id = state
        .services
        .publishers
        .create(&PublisherFields {
            name: "Gollancz".to_string(),
            address: String::new(),
            website: String::new(),
        })
        .await
        .unwrap();

    let nonce = state.services.nonces.create(admin.id, "edit_publisher").await.unwrap();
    let body = format!("id={}&name={}&_wpnonce={}", id, "y".repeat(300), nonce);
    let response = send(&state, post_form("/admin/publishers/edit", Some(&token), &body)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/publishers?message=updated");
    let stored = state.services.publishers.get_required(id).await.unwrap();
    assert_eq!(stored.name, "Gollancz");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn book_delete_is_scoped_single_use_and_owner_checked(pool: PgPool) {
    let state = app_state(pool);
    let (owner, owner_token) = create_user(&state, "owner", Role::Author).await;
    let (other, other_token) = create_user(&state, "other", Role::Author).await;
    let nonces = &state.services.nonces;

    let id = book_by(&state, &owner_token, "The Dispossessed").await;
    let spare = book_by(&state, &owner_token, "The Lathe of Heaven").await;

    // Another author holds a valid token but does not own the book
    let foreign = nonces.create(other.id, &format!("delete_book_{}", id)).await.unwrap();
    let body = format!("id={}&_wpnonce={}", id, foreign);
    let response = send(&state, post_form("/admin/books/delete", Some(&other_token), &body)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(state.services.books.get(id).await.unwrap().is_some());

    // A token issued for one row does not delete another
    let for_spare = nonces.create(owner.id, &format!("delete_book_{}", spare)).await.unwrap();
    let body = format!("id={}&_wpnonce={}", id, for_spare);
    let response = send(&state, post_form("/admin/books/delete", Some(&owner_token), &body)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(state.services.books.get(id).await.unwrap().is_some());

    let nonce = nonces.create(owner.id, &format!("delete_book_{}", id)).await.unwrap();
    let body = format!("id={}&_wpnonce={}", id, nonce);
    let response = send(&state, post_form("/admin/books/delete", Some(&owner_token), &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/books?message=deleted");
    assert!(state.services.books.get(id).await.unwrap().is_none());

    let replay = send(&state, post_form("/admin/books/delete", Some(&owner_token), &body)).await;
    assert_eq!(replay.status(), StatusCode::FORBIDDEN);
    assert!(state.services.books.get(spare).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn book_save_rejects_missing_or_foreign_editor_token(pool: PgPool) {
    let state = app_state(pool);
    let (owner, token) = create_user(&state, "owner", Role::Author).await;
    let (other, _) = create_user(&state, "other", Role::Author).await;
    let nonces = &state.services.nonces;
    let id = book_by(&state, &token, "Parable of the Sower").await;
    let uri = format!("/admin/books/{}", id);

    let missing = send(&state, post_form(&uri, Some(&token), "title=Defaced&status=publish")).await;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let other_user = nonces.create(other.id, "book_details").await.unwrap();
    let body = format!("title=Defaced&status=publish&_wpnonce={}", other_user);
    let response = send(&state, post_form(&uri, Some(&token), &body)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let other_action = nonces.create(owner.id, "add_author").await.unwrap();
    let body = format!("title=Defaced&status=publish&_wpnonce={}", other_action);
    let response = send(&state, post_form(&uri, Some(&token), &body)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let stored = state.services.books.get_required(id).await.unwrap();
    assert_eq!(stored.title, "Parable of the Sower");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn search_returns_matching_rows_as_json(pool: PgPool) {
    let state = app_state(pool);
    let (user, token) = create_user(&state, "writer", Role::Author).await;
    for name in ["Ursula K. Le Guin", "Octavia E. Butler", "Mary Shelley"] {
        state.services.authors.create(&author(name)).await.unwrap();
    }
    state
        .services
        .publishers
        .create(&PublisherFields {
            name: "Ace Books".to_string(),
            address: String::new(),
            website: String::new(),
        })
        .await
        .unwrap();
    let nonce = state.services.nonces.create(user.id, AJAX_ACTION).await.unwrap();

    let body = format!("search=LE+GUIN&nonce={}", nonce);
    let response = send(&state, post_form("/admin/ajax/search-authors", Some(&token), &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rows: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Ursula K. Le Guin");

    // The shared token is still valid; an empty query lists everything by name
    let body = format!("search=&nonce={}", nonce);
    let response = send(&state, post_form("/admin/ajax/search-authors", Some(&token), &body)).await;
    let rows: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Mary Shelley", "Octavia E. Butler", "Ursula K. Le Guin"]);

    let body = format!("search=ace&nonce={}", nonce);
    let response = send(&state, post_form("/admin/ajax/search-publishers", Some(&token), &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rows: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["name"], "Ace Books");
}
