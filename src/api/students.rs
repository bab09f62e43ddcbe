//! Student management endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::student::{CreateStudent, Student},
};

use super::AuthenticatedUser;

/// List all students, newest first
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of students", body = Vec<Student>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_students(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Student>>> {
    claims.require_staff()?;

    let students = state.services.inventory.list_students().await?;
    Ok(Json(students))
}

/// Register a new student and provision their login identity
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Invalid input or password mismatch"),
        (status = 409, description = "Phone or email already registered")
    )
)]
pub async fn create_student(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(student): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    claims.require_staff()?;

    let created = state
        .services
        .inventory
        .create_student(student, claims.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
