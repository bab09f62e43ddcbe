//! Loan ledger endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::assignment::{Assignment, AssignmentDetails, IssueLoan},
};

use super::AuthenticatedUser;

/// Return response with assignment state
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub status: String,
    pub assignment: Assignment,
}

/// Issue a book to a student
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = IssueLoan,
    responses(
        (status = 201, description = "Book issued", body = Assignment),
        (status = 404, description = "Student or book not found"),
        (status = 422, description = "Out of stock or student already has an issued book")
    )
)]
pub async fn issue_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<IssueLoan>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    claims.require_staff()?;

    let assignment = state.services.loans.issue(request, claims.user_id).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Return an issued book (idempotent)
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(assignment_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_staff()?;

    let assignment = state.services.loans.return_loan(assignment_id).await?;

    Ok(Json(ReturnResponse {
        status: assignment.status.to_string(),
        assignment,
    }))
}

/// Full ledger of assignments, ordered by issue date
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All assignments", body = Vec<AssignmentDetails>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    claims.require_staff()?;

    let assignments = state.services.loans.ledger().await?;
    Ok(Json(assignments))
}

/// The calling student's open assignments
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own open assignments", body = Vec<AssignmentDetails>),
        (status = 403, description = "Students only"),
        (status = 404, description = "No student record matches the account")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    claims.require_student()?;

    let assignments = state.services.loans.my_loans(claims.user_id).await?;
    Ok(Json(assignments))
}
