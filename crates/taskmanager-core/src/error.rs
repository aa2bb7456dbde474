//! Error types shared by every core operation.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Field-level validation messages, keyed by form field name.
///
/// Ordered so re-rendered pages list fields deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when no errors were collected, otherwise a validation error.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() { Ok(()) } else { Err(CoreError::Validation(self)) }
    }
}

impl From<validator::ValidationErrors> for FormErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FormErrors::new();
        for (field, list) in errors.field_errors() {
            for err in list {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", err.code));
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

/// All errors produced by core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input was rejected; the messages are meant for the user.
    #[error("validation failed: {0:?}")]
    Validation(FormErrors),

    /// The referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Username/password pair did not match an account.
    #[error("invalid credentials")]
    Auth,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_errors_convert_to_ok() {
        assert!(FormErrors::new().into_result().is_ok());
    }

    #[test]
    fn collected_errors_convert_to_validation() {
        let mut errs = FormErrors::new();
        errs.add("title", "This field is required.");
        errs.add("title", "Too long.");
        assert_eq!(errs.get("title").len(), 2);
        assert!(matches!(errs.into_result(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn merge_appends_messages() {
        let mut a = FormErrors::new();
        a.add("email", "one");
        let mut b = FormErrors::new();
        b.add("email", "two");
        b.add_non_field("three");
        a.merge(b);
        assert_eq!(a.get("email"), ["one".to_owned(), "two".to_owned()]);
        assert!(a.contains(NON_FIELD_ERRORS));
    }
}
