//! Strength rules for newly chosen passwords.

pub const MIN_PASSWORD_LEN: usize = 8;

/// Passwords rejected outright regardless of length.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "11111111", "00000000", "iloveyou", "admin123",
    "welcome1", "letmein1", "abc12345", "baseball", "football", "sunshine",
    "princess", "superman", "trustno1", "passw0rd",
];

/// Every rule `password` breaks, as user-facing messages. Empty means the
/// password is acceptable.
pub fn check_password_strength(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_owned());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_owned());
    }

    let user = username.trim().to_lowercase();
    if user.chars().count() >= 3 && (lowered.contains(&user) || user.contains(&lowered)) {
        problems.push("The password is too similar to the username.".to_owned());
    }

    problems
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reasonable_password_passes() {
        assert!(check_password_strength("pass123456", "testersignip").is_empty());
        assert!(check_password_strength("pol1234567890", "tester_views").is_empty());
    }

    #[test]
    fn short_password_is_rejected() {
        assert_eq!(check_password_strength("a1b2c3", "bob").len(), 1);
    }

    #[test]
    fn numeric_and_common_passwords_are_rejected() {
        let problems = check_password_strength("1234567890", "tester");
        assert!(problems.iter().any(|p| p.contains("numeric")));
        assert!(problems.iter().any(|p| p.contains("common")));
    }

    #[test]
    fn password_containing_username_is_rejected() {
        let problems = check_password_strength("Tester2024!", "tester");
        assert!(problems.iter().any(|p| p.contains("similar")));
    }

    #[test]
    fn short_usernames_do_not_trigger_similarity() {
        assert!(check_password_strength("zz-horse-battery", "zz").is_empty());
    }
}
