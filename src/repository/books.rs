//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Create a new book; all copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, description, author_id, category_id, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.author_id)
        .bind(book.category_id)
        .bind(book.total_copies)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update a book. The row is locked for the duration so a
    /// `total_copies` adjustment cannot interleave with an in-flight
    /// borrow or return; `available_copies` moves by the same delta.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let new_total = update.total_copies.unwrap_or(book.total_copies);
        let new_available = if new_total != book.total_copies {
            if new_total < book.available_copies {
                return Err(AppError::Validation(
                    "Total copies must be greater or equal than available copies".to_string(),
                ));
            }
            let checked_out = book.total_copies - book.available_copies;
            if new_total < checked_out {
                return Err(AppError::Validation(format!(
                    "Total copies cannot drop below the {} currently checked out",
                    checked_out
                )));
            }
            book.available_copies + (new_total - book.total_copies)
        } else {
            book.available_copies
        };

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                author_id = COALESCE($3, author_id),
                category_id = COALESCE($4, category_id),
                total_copies = $5,
                available_copies = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.author_id)
        .bind(update.category_id)
        .bind(new_total)
        .bind(new_available)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book; its borrow history goes with it (FK cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
