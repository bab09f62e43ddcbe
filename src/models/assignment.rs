//! Loan ledger model: book assignments

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Assignment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Issued,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Issued => "issued",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issued" => Ok(LoanStatus::Issued),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as VARCHAR)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Assignment model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: i32,
    pub transaction_id: Uuid,
    pub book_id: i32,
    pub student_id: i32,
    pub issue_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub issued_by: Option<i32>,
}

/// Assignment with book and student names, for ledger listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssignmentDetails {
    pub id: i32,
    pub transaction_id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub book_isbn: String,
    pub student_id: i32,
    pub student_name: String,
    pub issue_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

/// Issue loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueLoan {
    pub student_id: i32,
    pub book_id: i32,
    /// Defaults to today when omitted
    pub issue_date: Option<NaiveDate>,
}
