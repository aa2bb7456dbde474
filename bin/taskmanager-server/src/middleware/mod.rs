//! HTTP middleware and request extractors.
//!
//! - [`trace`]   – per-request span with a trace id, start/finish logging.
//! - [`session`] – session cookie handling and the [`session::RequestContext`]
//!   / [`session::Authenticated`] extractors that thread the caller's
//!   identity into handlers.

pub mod session;
pub mod trace;
