//! src/domain/signup_record.rs

use crate::domain::ValidationError;

/// One row sent to the `signups` table.
///
/// Can only be built through [`SignupRecord::parse`], so every record that
/// reaches a store has a non-empty first name and an email containing `@`.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SignupRecord {
    first_name: String,
    email: String,
}

impl SignupRecord {
    /// Values are taken as typed, without trimming.
    pub fn parse(first_name: String, email: String) -> Result<Self, ValidationError> {
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail(email));
        }
        if first_name.is_empty() {
            return Err(ValidationError::EmptyFirstName);
        }
        Ok(Self { first_name, email })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
