//! Data access and service behavior against a real database

use sqlx::PgPool;

use book_manager_server::{
    models::{
        author::AuthorFields,
        book::BookForm,
        publisher::PublisherFields,
        user::{Role, User, UserClaims},
    },
    repository::Repository,
    AppState,
};

use super::{app_state, create_user};

fn author(name: &str, bio: &str) -> AuthorFields {
    AuthorFields {
        name: name.to_string(),
        bio: bio.to_string(),
        image_url: String::new(),
    }
}

fn publisher(name: &str) -> PublisherFields {
    PublisherFields {
        name: name.to_string(),
        address: String::new(),
        website: "https://penguin.com".to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn inserted_author_is_returned_with_empty_fields_as_null(pool: PgPool) {
    let repository = Repository::new(pool);

    let id = repository.authors_insert(&author("George Orwell", "")).await.unwrap();
    let stored = repository.authors_get(id).await.unwrap().unwrap();

    assert_eq!(stored.name, "George Orwell");
    assert_eq!(stored.bio, None);
    assert_eq!(stored.image_url, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn authors_are_listed_by_name(pool: PgPool) {
    let repository = Repository::new(pool);
    for name in ["Tolkien", "Orwell", "Atwood"] {
        repository.authors_insert(&author(name, "")).await.unwrap();
    }

    let names: Vec<String> = repository
        .authors_list()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Atwood", "Orwell", "Tolkien"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn update_and_delete_report_missing_rows(pool: PgPool) {
    let repository = Repository::new(pool);

    assert!(!repository.authors_update(9999, &author("Nobody", "")).await.unwrap());
    assert!(!repository.publishers_delete(9999).await.unwrap());

    let id = repository.publishers_insert(&publisher("Penguin")).await.unwrap();
    assert!(repository.publishers_delete(id).await.unwrap());
    assert!(repository.publishers_get(id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn search_matches_names_case_insensitively(pool: PgPool) {
    let state = app_state(pool);
    let authors = &state.services.authors;
    for name in ["J.K. Rowling", "George Orwell", "J.R.R. Tolkien"] {
        authors.create(&author(name, "")).await.unwrap();
    }

    let found: Vec<String> = authors.search("ROW").await.unwrap().into_iter().map(|a| a.name).collect();
    assert_eq!(found, vec!["J.K. Rowling"]);
    assert_eq!(authors.search("").await.unwrap().len(), 3);
    assert!(authors.search("zzz").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn metadata_save_keeps_creator_and_stamps_editor(pool: PgPool) {
    let state = app_state(pool);
    let (writer, _) = create_user(&state, "writer", Role::Author).await;
    let (editor, _) = create_user(&state, "editor", Role::Editor).await;
    let writer_claims = claims(&state, &writer);
    let editor_claims = claims(&state, &editor);

    let books = &state.services.books;
    let form = BookForm {
        title: "Dune".into(),
        book_isbn: Some("978-0441013593".into()),
        book_pages: Some("412".into()),
        ..Default::default()
    };
    let id = books.create(&writer_claims, &form).await.unwrap();

    let edit = BookForm {
        title: "Dune".into(),
        book_edition: Some("2nd".into()),
        ..Default::default()
    };
    books.save(&editor_claims, id, &edit).await.unwrap();

    let book = books.get_required(id).await.unwrap();
    assert_eq!(book.created_by, Some(writer.id));
    assert_eq!(book.updated_by, Some(editor.id));
    assert_eq!(book.meta.isbn.as_deref(), Some("978-0441013593"));
    assert_eq!(book.meta.pages, Some(412));
    assert_eq!(book.meta.edition.as_deref(), Some("2nd"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn autosave_leaves_metadata_alone(pool: PgPool) {
    let state = app_state(pool);
    let (writer, _) = create_user(&state, "writer", Role::Author).await;
    let claims = claims(&state, &writer);
    let books = &state.services.books;

    let id = books
        .create(&claims, &BookForm {
            title: "Draft".into(),
            book_country: Some("France".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    books
        .save(&claims, id, &BookForm {
            title: "Draft, revised".into(),
            autosave: Some("1".into()),
            book_country: Some("Spain".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let book = books.get_required(id).await.unwrap();
    assert_eq!(book.title, "Draft, revised");
    assert_eq!(book.meta.country.as_deref(), Some("France"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn authors_cannot_edit_or_list_others_books(pool: PgPool) {
    let state = app_state(pool);
    let (first, _) = create_user(&state, "first", Role::Author).await;
    let (second, _) = create_user(&state, "second", Role::Author).await;
    let (editor, _) = create_user(&state, "editor", Role::Editor).await;
    let books = &state.services.books;

    let form = BookForm {
        title: "Mine".into(),
        ..Default::default()
    };
    let id = books.create(&claims(&state, &first), &form).await.unwrap();

    assert!(books.save(&claims(&state, &second), id, &form).await.is_err());
    assert!(books.list_for(&claims(&state, &second)).await.unwrap().is_empty());
    assert_eq!(books.list_for(&claims(&state, &first)).await.unwrap().len(), 1);
    assert_eq!(books.list_for(&claims(&state, &editor)).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn deleted_author_is_omitted_from_panel(pool: PgPool) {
    let state = app_state(pool);
    let (writer, _) = create_user(&state, "writer", Role::Author).await;
    let author_id = state.services.authors.create(&author("Frank Herbert", "Born 1920.")).await.unwrap();
    let publisher_id = state.services.publishers.create(&publisher("Chilton")).await.unwrap();

    let form = BookForm {
        title: "Dune".into(),
        book_author_id: Some(author_id.to_string()),
        book_publisher_id: Some(publisher_id.to_string()),
        ..Default::default()
    };
    let id = state.services.books.create(&claims(&state, &writer), &form).await.unwrap();

    state.services.authors.delete(author_id).await.unwrap();

    let book = state.services.books.get_required(id).await.unwrap();
    assert_eq!(book.meta.author_id, None);

    let panel = state.services.renderer.assemble(&book).await.unwrap();
    let labels: Vec<&str> = panel.items.iter().map(|i| i.label).collect();
    assert!(!labels.contains(&"Author"));
    assert!(labels.contains(&"Publisher"));
    assert_eq!(panel.author_bio, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn macro_expands_to_panel_or_nothing(pool: PgPool) {
    let state = app_state(pool);
    let (writer, _) = create_user(&state, "writer", Role::Author).await;
    let claims = claims(&state, &writer);

    let other = state
        .services
        .books
        .create(&claims, &BookForm {
            title: "Other".into(),
            book_isbn: Some("111".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let id = state
        .services
        .books
        .create(&claims, &BookForm {
            title: "Host".into(),
            content: format!("See [book_info id=\"{}\"] and [book_info id=\"99999\"].", other),
            ..Default::default()
        })
        .await
        .unwrap();

    let book = state.services.books.get_required(id).await.unwrap();
    let html = state.services.renderer.content(&book).await.unwrap();
    assert!(html.starts_with("See "));
    assert!(html.contains("<dd>111</dd>"));
    assert!(html.ends_with(" and ."));

    assert_eq!(state.services.renderer.book_info(99999).await.unwrap(), "");
}

fn claims(state: &AppState, user: &User) -> UserClaims {
    let token = state.services.users.create_token_for_user(user).unwrap();
    UserClaims::from_token(&token, &state.config.auth.jwt_secret).unwrap()
}
