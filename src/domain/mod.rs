//! src/domain/mod.rs

mod signup_record;

pub use signup_record::SignupRecord;

/// Validation error for signup form data
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("First name must not be empty.")]
    EmptyFirstName,
    #[error("Email must not be empty.")]
    EmptyEmail,
    #[error("`{0}` is not a valid email, it lacks an `@`.")]
    InvalidEmail(String),
}
