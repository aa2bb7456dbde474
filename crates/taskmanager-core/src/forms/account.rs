use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::check_password_strength;
use crate::error::FormErrors;
use crate::forms::collect_errors;

pub const MAX_USERNAME_LEN: usize = 150;

const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

/// Registration form. Password fields are never serialised back into a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SignUpForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

/// A registration that passed every check not needing the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    pub fn clean(&self) -> Result<NewAccount, FormErrors> {
        let username = self.username.trim();
        let email = self.email.trim();
        let trimmed = SignUpForm {
            username: username.to_owned(),
            email: email.to_owned(),
            ..self.clone()
        };
        let mut errors = collect_errors(
            &[
                ("username", username),
                ("email", email),
                ("password1", self.password1.as_str()),
                ("password2", self.password2.as_str()),
            ],
            trimmed.validate(),
        );

        if !username.is_empty() && !username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", PASSWORD_MISMATCH);
            } else {
                for problem in check_password_strength(&self.password2, username) {
                    errors.add("password2", problem);
                }
            }
        }

        if errors.is_empty() {
            Ok(NewAccount {
                username: username.to_owned(),
                email: email.to_owned(),
                password: self.password2.clone(),
            })
        } else {
            Err(errors)
        }
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl SignInForm {
    /// `(username, password)` when both are present.
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        let username = self.username.trim();
        let errors = collect_errors(
            &[("username", username), ("password", self.password.as_str())],
            Ok(()),
        );
        if errors.is_empty() {
            Ok((username.to_owned(), self.password.clone()))
        } else {
            Err(errors)
        }
    }
}

/// Password change form. The old password is verified by
/// [`crate::accounts::change_password`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

impl PasswordChangeForm {
    /// Checks everything except the old password; yields the new password.
    pub fn clean(&self, username: &str) -> Result<String, FormErrors> {
        let mut errors = collect_errors(
            &[
                ("old_password", self.old_password.as_str()),
                ("new_password1", self.new_password1.as_str()),
                ("new_password2", self.new_password2.as_str()),
            ],
            Ok(()),
        );
        if !self.new_password1.is_empty() && !self.new_password2.is_empty() {
            if self.new_password1 != self.new_password2 {
                errors.add("new_password2", PASSWORD_MISMATCH);
            } else {
                for problem in check_password_strength(&self.new_password2, username) {
                    errors.add("new_password2", problem);
                }
            }
        }
        if errors.is_empty() { Ok(self.new_password2.clone()) } else { Err(errors) }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn sign_up(password1: &str, password2: &str) -> SignUpForm {
        SignUpForm {
            username: "testersignip".into(),
            email: "a@a.qw".into(),
            password1: password1.into(),
            password2: password2.into(),
        }
    }

    #[test]
    fn matching_passwords_clean() {
        let acc = sign_up("pass123456", "pass123456").clean().unwrap();
        assert_eq!(acc.username, "testersignip");
        assert_eq!(acc.email, "a@a.qw");
        assert_eq!(acc.password, "pass123456");
    }

    #[test]
    fn mismatched_passwords_are_reported_on_confirmation() {
        let errors = sign_up("pass123456", "pdfvdvfdnj").clean().unwrap_err();
        assert_eq!(errors.get("password2"), [PASSWORD_MISMATCH.to_owned()]);
    }

    #[test]
    fn weak_password_is_reported() {
        let errors = sign_up("1234567890", "1234567890").clean().unwrap_err();
        assert!(!errors.get("password2").is_empty());
    }

    #[test]
    fn invalid_email_is_reported() {
        let form = SignUpForm { email: "not-an-email".into(), ..sign_up("pass123456", "pass123456") };
        assert!(form.clean().unwrap_err().contains("email"));
    }

    #[test]
    fn empty_fields_report_required_only() {
        let errors = SignUpForm::default().clean().unwrap_err();
        for field in ["username", "email", "password1", "password2"] {
            assert_eq!(errors.get(field), [crate::forms::REQUIRED.to_owned()], "{field}");
        }
    }

    #[test]
    fn username_charset_is_enforced() {
        let form = SignUpForm { username: "bad name!".into(), ..sign_up("pass123456", "pass123456") };
        assert!(form.clean().unwrap_err().contains("username"));
        let form = SignUpForm { username: "ok.name+1@x".into(), ..sign_up("pass123456", "pass123456") };
        assert!(form.clean().is_ok());
    }

    #[test]
    fn overlong_username_is_reported() {
        let form = SignUpForm {
            username: "u".repeat(MAX_USERNAME_LEN + 1),
            ..sign_up("pass123456", "pass123456")
        };
        assert!(form.clean().unwrap_err().contains("username"));
    }

    #[test]
    fn passwords_are_not_serialised() {
        let json = serde_json::to_value(sign_up("secret-one", "secret-one")).unwrap();
        assert!(json.get("password1").is_none());
        assert!(json.get("password2").is_none());
        assert_eq!(json["username"], "testersignip");
    }

    #[test]
    fn sign_in_requires_both_fields() {
        let form = SignInForm { username: "tester".into(), password: String::new() };
        assert!(form.clean().unwrap_err().contains("password"));
    }

    #[test]
    fn password_change_checks_match_and_strength() {
        let form = PasswordChangeForm {
            old_password: "12345".into(),
            new_password1: "pol1234567890".into(),
            new_password2: "pol1234dvsd567890".into(),
        };
        assert!(form.clean("tester_views").unwrap_err().contains("new_password2"));

        let form = PasswordChangeForm { new_password2: "pol1234567890".into(), ..form };
        assert_eq!(form.clean("tester_views").unwrap(), "pol1234567890");
    }
}
