//! Credentials: password hashing and the strength policy applied to new
//! passwords.

pub mod password;
pub mod policy;

pub use password::{hash_password, verify_password, verify_password_dummy};
pub use policy::check_password_strength;
