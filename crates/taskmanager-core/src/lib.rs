//! taskmanager-core – domain, persistence and account logic for the task
//! tracker.
//!
//! The crate has no HTTP dependency. `taskmanager-server` owns routing,
//! cookies and rendering and calls into the modules here:
//!
//! - [`domain`]    – `Status` / `Priority` enumerations and their text forms.
//! - [`entities`]  – row types and the SQLite-backed store traits.
//! - [`forms`]     – validation of untrusted input into entity mutations.
//! - [`auth`]      – password hashing and the strength policy.
//! - [`accounts`]  – register / authenticate / change password / delete.
//! - [`notifier`]  – fire-and-forget welcome message queue.

pub mod accounts;
pub mod auth;
pub mod domain;
pub mod entities;
pub mod error;
pub mod forms;
pub mod notifier;

pub use error::{CoreError, FormErrors};
