//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod borrows;
pub mod categories;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub authors: authors::AuthorsRepository,
    pub categories: categories::CategoriesRepository,
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            pool,
        }
    }
}
