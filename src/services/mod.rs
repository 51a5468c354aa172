//! Business logic services

pub mod borrows;
pub mod catalog;
pub mod users;

use crate::{
    config::{AuthConfig, BorrowingConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        borrowing_config: BorrowingConfig,
    ) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository, borrowing_config),
        }
    }
}
