//! Categories repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CategoryName},
};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all categories
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Check if a category exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if a category name is already taken
    pub async fn name_exists(&self, name: CategoryName, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND id != $2)",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new category
    pub async fn create(&self, name: CategoryName) -> AppResult<Category> {
        let created =
            sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(created)
    }

    /// Update a category
    pub async fn update(&self, id: i32, name: CategoryName) -> AppResult<Category> {
        let updated = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING *",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete a category
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category with id {} not found", id)));
        }
        Ok(())
    }
}
