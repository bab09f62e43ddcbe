//! Book model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[schema(value_type = String, example = "19.90")]
    pub price: Decimal,
    /// Copies currently in stock. Mutated only by the loan ledger.
    pub quantity: i32,
    pub description: Option<String>,
    pub pages: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i32>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 50, message = "Title must be 1-50 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 50, message = "Author must be 1-50 characters"))]
    pub author: String,
    #[validate(length(min = 10, max = 13, message = "ISBN must be 10-13 characters"))]
    pub isbn: String,
    #[schema(value_type = String, example = "19.90")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    #[validate(length(max = 1000, message = "Description is limited to 1000 characters"))]
    pub description: Option<String>,
    pub pages: Option<i32>,
}

/// Book search parameters. Page size is fixed at [`BookQuery::PAGE_SIZE`].
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive substring match over title, author and isbn
    pub q: Option<String>,
    pub page: Option<i64>,
}

impl BookQuery {
    pub const PAGE_SIZE: i64 = 10;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * Self::PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_uses_fixed_page_size() {
        let query = BookQuery {
            q: None,
            page: Some(3),
        };
        assert_eq!(query.offset(), 20);
        assert_eq!(BookQuery::PAGE_SIZE, 10);
    }

    #[test]
    fn page_defaults_to_first_and_clamps_below_one() {
        assert_eq!(BookQuery::default().page(), 1);
        let query = BookQuery {
            q: None,
            page: Some(0),
        };
        assert_eq!(query.offset(), 0);
    }
}
