//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor, UpdateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all authors
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(authors)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Check if an author exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Check if an author name is already taken
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE name = $1 AND id != $2)")
                .bind(name)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, bio) VALUES ($1, $2) RETURNING *",
        )
        .bind(&author.name)
        .bind(&author.bio)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update an author
    pub async fn update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        let updated = sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET name = COALESCE($1, name),
                bio = COALESCE($2, bio)
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(author.name.as_deref())
        .bind(author.bio.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete an author
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }
}
