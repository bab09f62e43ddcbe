//! Loan ledger service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::assignment::{Assignment, AssignmentDetails, IssueLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Issue a book to a student
    pub async fn issue(&self, request: IssueLoan, issued_by: i32) -> AppResult<Assignment> {
        // Verify the student exists before touching stock
        self.repository
            .students
            .get_by_id(request.student_id)
            .await?;

        let issue_date = request
            .issue_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let assignment = self
            .repository
            .assignments
            .issue(request.student_id, request.book_id, issue_date, issued_by)
            .await?;

        tracing::info!(
            assignment = assignment.id,
            book = assignment.book_id,
            student = assignment.student_id,
            "book issued"
        );

        Ok(assignment)
    }

    /// Return an issued book (idempotent)
    pub async fn return_loan(&self, assignment_id: i32) -> AppResult<Assignment> {
        let return_date = Utc::now().date_naive();
        self.repository
            .assignments
            .return_loan(assignment_id, return_date)
            .await
    }

    /// Full ledger, ordered by issue date
    pub async fn ledger(&self) -> AppResult<Vec<AssignmentDetails>> {
        self.repository.assignments.list().await
    }

    /// Open assignments of the student matching the caller's email
    pub async fn my_loans(&self, user_id: i32) -> AppResult<Vec<AssignmentDetails>> {
        let user = self.repository.users.get_by_id(user_id).await?;

        let email = user.email.ok_or_else(|| {
            AppError::NotFound("No student record matches your account".to_string())
        })?;

        let student = self
            .repository
            .students
            .get_by_email(&email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No student record matches your account".to_string())
            })?;

        self.repository.assignments.open_for_student(student.id).await
    }
}
