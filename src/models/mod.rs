//! Data models for Shelfmark

pub mod assignment;
pub mod book;
pub mod student;
pub mod user;

// Re-export commonly used types
pub use assignment::{Assignment, AssignmentDetails, LoanStatus};
pub use book::Book;
pub use student::Student;
pub use user::{Role, User, UserClaims};
