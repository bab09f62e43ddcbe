//! Loan ledger repository.
//!
//! Issue and return each run inside a single transaction: the stock mutation
//! and the ledger write commit together or not at all.

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::assignment::{Assignment, AssignmentDetails, LoanStatus},
};

const DETAILS_SELECT: &str = r#"
    SELECT a.id, a.transaction_id, a.book_id, b.title AS book_title, b.isbn AS book_isbn,
           a.student_id, s.name AS student_name, a.issue_date, a.return_date, a.status
    FROM book_assignments a
    JOIN books b ON b.id = a.book_id
    JOIN students s ON s.id = a.student_id
"#;

/// True when the error is a unique violation on the one-active-loan index.
fn is_active_loan_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.constraint())
        .map(|c| c == "book_assignments_one_active_per_student")
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct AssignmentsRepository {
    pool: Pool<Postgres>,
}

impl AssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get assignment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Assignment> {
        sqlx::query_as::<_, Assignment>("SELECT * FROM book_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))
    }

    /// Issue a book to a student.
    ///
    /// Fails with `ActiveLoan` if the student already holds an issued book and
    /// with `OutOfStock` if the quantity is exhausted. The quantity decrement
    /// is a conditional update (`quantity > 0`), so concurrent issues on the
    /// same book can never drive the stock negative; the partial unique index
    /// on open loans backs up the active-loan check under races.
    pub async fn issue(
        &self,
        student_id: i32,
        book_id: i32,
        issue_date: NaiveDate,
        issued_by: i32,
    ) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let active_title: Option<String> = sqlx::query_scalar(
            r#"
            SELECT b.title
            FROM book_assignments a
            JOIN books b ON b.id = a.book_id
            WHERE a.student_id = $1 AND a.status = 'issued'
            "#,
        )
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(title) = active_title {
            return Err(AppError::ActiveLoan(format!(
                "{}. Return it first",
                title
            )));
        }

        let updated = sqlx::query(
            "UPDATE books SET quantity = quantity - 1, updated_at = NOW() WHERE id = $1 AND quantity > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let title: Option<String> =
                sqlx::query_scalar("SELECT title FROM books WHERE id = $1")
                    .bind(book_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match title {
                Some(title) => Err(AppError::OutOfStock(title)),
                None => Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                ))),
            };
        }

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO book_assignments (transaction_id, book_id, student_id, issue_date, status, issued_by)
            VALUES ($1, $2, $3, $4, 'issued', $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(student_id)
        .bind(issue_date)
        .bind(issued_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_active_loan_violation(&e) {
                AppError::ActiveLoan("another issue won the race. Return it first".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        tx.commit().await?;

        Ok(assignment)
    }

    /// Return an issued book.
    ///
    /// Idempotent: returning an already-returned assignment changes nothing
    /// and hands back the record as stored.
    pub async fn return_loan(&self, id: i32, return_date: NaiveDate) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM book_assignments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))?;

        if assignment.status == LoanStatus::Returned {
            return Ok(assignment);
        }

        let returned = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE book_assignments
            SET status = 'returned', return_date = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(return_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET quantity = quantity + 1, updated_at = NOW() WHERE id = $1")
            .bind(assignment.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(returned)
    }

    /// Full ledger with book and student names, ordered by issue date
    pub async fn list(&self) -> AppResult<Vec<AssignmentDetails>> {
        let query = format!("{} ORDER BY a.issue_date, a.id", DETAILS_SELECT);
        let assignments = sqlx::query_as::<_, AssignmentDetails>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(assignments)
    }

    /// Open assignments for one student, ordered by issue date
    pub async fn open_for_student(&self, student_id: i32) -> AppResult<Vec<AssignmentDetails>> {
        let query = format!(
            "{} WHERE a.student_id = $1 AND a.status = 'issued' ORDER BY a.issue_date, a.id",
            DETAILS_SELECT
        );
        let assignments = sqlx::query_as::<_, AssignmentDetails>(&query)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(assignments)
    }
}
