//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if an ISBN is already cataloged
    pub async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook, created_by: i32) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, price, quantity, description, pages, created_by)
            VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.price)
        .bind(book.quantity)
        .bind(&book.description)
        .bind(book.pages)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Search books with pagination (fixed page size).
    ///
    /// The query term is matched case-insensitively as a substring of
    /// title, author or isbn.
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let pattern = query
            .q
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .map(|q| format!("%{}%", q.trim()));

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE $1::text IS NULL
               OR title ILIKE $1 OR author ILIKE $1 OR isbn ILIKE $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(BookQuery::PAGE_SIZE)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE $1::text IS NULL
               OR title ILIKE $1 OR author ILIKE $1 OR isbn ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((books, total))
    }
}
