//! Inventory service: book and student CRUD

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook},
        student::{CreateStudent, Student},
    },
    repository::Repository,
};

use super::auth;

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Search books with pagination
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Catalog a new book
    pub async fn create_book(&self, book: CreateBook, created_by: i32) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.isbn_exists(&book.isbn).await? {
            return Err(AppError::Duplicate(format!(
                "A book with ISBN {} already exists",
                book.isbn
            )));
        }

        self.repository.books.create(&book, created_by).await
    }

    /// List all students
    pub async fn list_students(&self) -> AppResult<Vec<Student>> {
        self.repository.students.list().await
    }

    /// Register a new student and provision their login identity.
    ///
    /// The identity uses the student's email as username with role student,
    /// so the student can later consult their own issued books.
    pub async fn create_student(
        &self,
        student: CreateStudent,
        created_by: i32,
    ) -> AppResult<Student> {
        student
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if student.password != student.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        if self.repository.students.phone_exists(&student.phone).await? {
            return Err(AppError::Duplicate(format!(
                "A student with phone {} already exists",
                student.phone
            )));
        }

        if self
            .repository
            .users
            .username_exists(&student.email)
            .await?
        {
            return Err(AppError::Duplicate(
                "An account already exists for this email".to_string(),
            ));
        }

        // Identity and student record commit together or not at all
        let hash = auth::hash_password(&student.password)?;
        self.repository
            .students
            .create_with_identity(&student, &hash, created_by)
            .await
    }
}
