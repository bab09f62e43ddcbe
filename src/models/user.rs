//! Identity model, roles and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Account roles. Exactly one role per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Librarian,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Librarian => "librarian",
            Role::Student => "student",
        }
    }

    /// Admins and librarians share the staff authorization class.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Librarian)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "librarian" => Ok(Role::Librarian),
            "student" => Ok(Role::Student),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as VARCHAR)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Login identity from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct Register {
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Inventory and ledger mutation require the staff class (admin or librarian).
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Admins or librarians only".to_string(),
            ))
        }
    }

    /// The own-loans view is restricted to student accounts.
    pub fn require_student(&self) -> Result<(), AppError> {
        if self.role == Role::Student {
            Ok(())
        } else {
            Err(AppError::Authorization("Students only".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "someone".to_string(),
            user_id: 1,
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn staff_class_covers_admin_and_librarian() {
        assert!(claims(Role::Admin).require_staff().is_ok());
        assert!(claims(Role::Librarian).require_staff().is_ok());
        assert!(claims(Role::Student).require_staff().is_err());
    }

    #[test]
    fn student_gate_fails_closed_for_staff() {
        assert!(claims(Role::Student).require_student().is_ok());
        assert!(claims(Role::Admin).require_student().is_err());
        assert!(claims(Role::Librarian).require_student().is_err());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Librarian".parse::<Role>().unwrap(), Role::Librarian);
        assert_eq!("STUDENT".parse::<Role>().unwrap(), Role::Student);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let claims = UserClaims {
            sub: "alice".to_string(),
            user_id: 7,
            role: Role::Librarian,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        };
        let token = claims.create_token("test-secret").unwrap();
        let parsed = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.sub, "alice");
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.role, Role::Librarian);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let claims = UserClaims {
            sub: "alice".to_string(),
            user_id: 7,
            role: Role::Admin,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        };
        let token = claims.create_token("test-secret").unwrap();
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
