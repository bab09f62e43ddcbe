//! Students repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        student::{CreateStudent, Student},
        user::Role,
    },
};

/// Backstop for unique-violation races that slip past the explicit checks
fn map_unique_violation(err: sqlx::Error) -> AppError {
    match err.as_database_error().and_then(|db| db.constraint()) {
        Some("students_phone_key") => {
            AppError::Duplicate("A student with this phone already exists".to_string())
        }
        Some("users_username_key") => {
            AppError::Duplicate("An account already exists for this email".to_string())
        }
        _ => AppError::Database(err),
    }
}

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Find the student record matching a login email, if any
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    /// Check if a phone number is already registered
    pub async fn phone_exists(&self, phone: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE phone = $1)")
                .bind(phone)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a student and their login identity in one transaction.
    ///
    /// The identity (username = email, role student) and the student record
    /// commit together or not at all, so a failed insert can never leave an
    /// orphan login blocking the email.
    pub async fn create_with_identity(
        &self,
        student: &CreateStudent,
        password_hash: &str,
        created_by: i32,
    ) -> AppResult<Student> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (username, email, password, role) VALUES ($1, $2, $3, $4)")
            .bind(&student.email)
            .bind(&student.email)
            .bind(password_hash)
            .bind(Role::Student)
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        let created = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, email, phone, address, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.address)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        tx.commit().await?;

        Ok(created)
    }

    /// List all students, newest first
    pub async fn list(&self) -> AppResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(students)
    }
}
