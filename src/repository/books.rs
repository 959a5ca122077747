//! Books repository: catalog rows and the borrow/return transactions

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{is_unique_violation, like_pattern};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookChanges, NewBook},
        Book, BorrowRecord,
    },
};

/// Persistence seam for the book service.
///
/// `borrow` and `return_book` are each a single transaction holding a row
/// lock on the book, so the flag, the counter and the borrow record always
/// move together.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    /// Active book by id, `NotFound` otherwise
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book>;

    /// Active books ordered by name; `search` is a case-insensitive substring
    async fn list(&self, search: &str, limit: i64) -> AppResult<Vec<Book>>;

    async fn update(&self, id: Uuid, changes: &BookChanges) -> AppResult<Book>;

    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;

    /// Active books by borrow count, ties broken by id
    async fn most_borrowed(&self, search: &str, limit: i64) -> AppResult<Vec<Book>>;

    /// Open a borrow record for `user_id`.
    /// `NotFound` for a missing book, `Conflict` when it is already out.
    async fn borrow(&self, book_id: Uuid, user_id: Uuid) -> AppResult<BorrowRecord>;

    /// Close the caller's open borrow record.
    /// `Conflict` when the book is not out, `NotFound` when the caller
    /// holds no open record for it.
    async fn return_book(&self, book_id: Uuid, user_id: Uuid) -> AppResult<BorrowRecord>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn book_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (id, name, author_id, category_id, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&book.name)
        .bind(book.author_id)
        .bind(book.category_id)
        .bind(book.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| book_not_found(id))
    }

    async fn list(&self, search: &str, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name, id
            LIMIT $2
            "#,
        )
        .bind(like_pattern(search))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn update(&self, id: Uuid, changes: &BookChanges) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET name = COALESCE($2, name),
                author_id = COALESCE($3, author_id),
                category_id = COALESCE($4, category_id),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.author_id)
        .bind(changes.category_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| book_not_found(id))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE books SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(book_not_found(id));
        }
        Ok(())
    }

    async fn most_borrowed(&self, search: &str, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR name ILIKE $1)
            ORDER BY borrows DESC, id ASC
            LIMIT $2
            "#,
        )
        .bind(like_pattern(search))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn borrow(&self, book_id: Uuid, user_id: Uuid) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| book_not_found(book_id))?;

        // Early returns drop `tx`, which rolls back.
        if book.is_borrowed {
            return Err(AppError::Conflict("Book is already borrowed".to_string()));
        }

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (id, book_id, user_id, borrowed_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Book is already borrowed".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        sqlx::query(
            "UPDATE books SET is_borrowed = TRUE, borrows = borrows + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn return_book(&self, book_id: Uuid, user_id: Uuid) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| book_not_found(book_id))?;

        if !book.is_borrowed {
            return Err(AppError::Conflict("Book is not borrowed".to_string()));
        }

        let open = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT * FROM borrow_records
            WHERE book_id = $1 AND user_id = $2
              AND returned_at IS NULL AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No open borrow record for this user and book".to_string())
        })?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET returned_at = GREATEST(NOW(), borrowed_at), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(open.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET is_borrowed = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }
}
