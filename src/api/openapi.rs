//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, students};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "1.0.0",
        description = "Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        auth::logout,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        // Students
        students::list_students,
        students::create_student,
        // Loans
        loans::issue_loan,
        loans::return_loan,
        loans::list_loans,
        loans::my_loans,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::LogoutResponse,
            crate::models::user::Register,
            crate::models::user::Role,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::BookQuery,
            books::PaginatedBooks,
            // Students
            crate::models::student::Student,
            crate::models::student::CreateStudent,
            // Loans
            crate::models::assignment::Assignment,
            crate::models::assignment::AssignmentDetails,
            crate::models::assignment::IssueLoan,
            crate::models::assignment::LoanStatus,
            loans::ReturnResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "students", description = "Student management"),
        (name = "loans", description = "Loan ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_paginated_book_listing() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("document has components").schemas;
        assert!(schemas.contains_key("PaginatedBooks"));
        assert!(schemas.contains_key("Book"));
        assert!(schemas.contains_key("AssignmentDetails"));
    }
}
