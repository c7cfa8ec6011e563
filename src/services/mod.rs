//! Business logic services

pub mod authors;
pub mod books;
pub mod nonces;
pub mod publishers;
pub mod redis;
pub mod renderer;
pub mod search;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services, built once at startup
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub publishers: publishers::PublishersService,
    pub books: books::BooksService,
    pub renderer: renderer::RendererService,
    pub nonces: nonces::NonceService,
    pub users: users::UsersService,
    /// Shared data access, for readiness probes
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and token storage
    pub fn new(repository: Repository, auth_config: AuthConfig, nonces: nonces::NonceService) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            publishers: publishers::PublishersService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            renderer: renderer::RendererService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            nonces,
            repository,
        }
    }
}
