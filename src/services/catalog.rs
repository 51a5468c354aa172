//! Catalog management service: categories, authors, books

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
        category::{Category, CreateCategory, UpdateCategory},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Categories

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn get_category(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn create_category(&self, request: CreateCategory) -> AppResult<Category> {
        if self
            .repository
            .categories
            .name_exists(request.name, None)
            .await?
        {
            return Err(AppError::Duplicate(format!(
                "Category '{}' already exists",
                request.name
            )));
        }
        self.repository.categories.create(request.name).await
    }

    pub async fn update_category(&self, id: i32, request: UpdateCategory) -> AppResult<Category> {
        if self
            .repository
            .categories
            .name_exists(request.name, Some(id))
            .await?
        {
            return Err(AppError::Duplicate(format!(
                "Category '{}' already exists",
                request.name
            )));
        }
        self.repository.categories.update(id, request.name).await
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        self.repository.categories.delete(id).await
    }

    // Authors

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, request: CreateAuthor) -> AppResult<Author> {
        request.validate()?;
        if self
            .repository
            .authors
            .name_exists(&request.name, None)
            .await?
        {
            return Err(AppError::Duplicate(format!(
                "Author '{}' already exists",
                request.name
            )));
        }
        self.repository.authors.create(&request).await
    }

    pub async fn update_author(&self, id: i32, request: UpdateAuthor) -> AppResult<Author> {
        request.validate()?;
        if let Some(ref name) = request.name {
            if self.repository.authors.name_exists(name, Some(id)).await? {
                return Err(AppError::Duplicate(format!(
                    "Author '{}' already exists",
                    name
                )));
            }
        }
        self.repository.authors.update(id, &request).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // Books

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, request: CreateBook) -> AppResult<Book> {
        request.validate()?;
        self.check_book_references(Some(request.author_id), Some(request.category_id))
            .await?;
        self.repository.books.create(&request).await
    }

    pub async fn update_book(&self, id: i32, request: UpdateBook) -> AppResult<Book> {
        request.validate()?;
        self.check_book_references(request.author_id, request.category_id)
            .await?;
        self.repository.books.update(id, &request).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// Referenced author and category must exist; a dangling id is a
    /// client error, not a database error.
    async fn check_book_references(
        &self,
        author_id: Option<i32>,
        category_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(author_id) = author_id {
            if !self.repository.authors.exists(author_id).await? {
                return Err(AppError::Validation(format!(
                    "Author with id {} does not exist",
                    author_id
                )));
            }
        }
        if let Some(category_id) = category_id {
            if !self.repository.categories.exists(category_id).await? {
                return Err(AppError::Validation(format!(
                    "Category with id {} does not exist",
                    category_id
                )));
            }
        }
        Ok(())
    }
}
