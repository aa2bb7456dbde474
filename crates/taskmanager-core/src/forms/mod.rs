//! Validation of untrusted form input.
//!
//! Every input shape is a plain deserialisable struct whose `clean()` either
//! yields the normalised value the store needs or a [`FormErrors`] map.
//! Declarative rules (lengths, email format) come from `validator` derives;
//! everything else is checked by hand in `clean()`. Nothing here touches the
//! database: checks that need it (username uniqueness, old password) live in
//! [`crate::accounts`].

pub mod account;
pub mod task;

pub use account::{NewAccount, PasswordChangeForm, SignInForm, SignUpForm};
pub use task::{parse_finish, TaskForm, FINISH_INPUT_FORMAT};

use validator::ValidationErrors;

use crate::error::FormErrors;

pub const REQUIRED: &str = "This field is required.";

/// Start an error map from required-field checks, then add validator
/// findings for fields that were not already reported as missing.
pub(crate) fn collect_errors(
    required: &[(&str, &str)],
    validation: Result<(), ValidationErrors>,
) -> FormErrors {
    let mut errors = FormErrors::new();
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.add(field, REQUIRED);
        }
    }
    if let Err(found) = validation {
        let found = FormErrors::from(found);
        let mut rest = FormErrors::new();
        for (field, _) in required {
            if errors.contains(field) {
                continue;
            }
            for msg in found.get(field) {
                rest.add(field, msg.clone());
            }
        }
        errors.merge(rest);
    }
    errors
}
