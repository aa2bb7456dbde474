//! Closed enumerations classifying a task.
//!
//! Text conversion lives in free functions rather than trait impls so the
//! enums stay plain tagged variants. The lowercase name is what the
//! database stores; forms additionally accept the numeric codes older
//! clients submit (`2`/`1`/`0`).

use strum::EnumIter;

/// Lifecycle state of a task. New tasks default to [`Status::Active`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum Status {
    #[default]
    Active,
    Finished,
    Failed,
}

/// Importance of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

pub fn status_name(status: Status) -> &'static str {
    match status {
        Status::Active => "active",
        Status::Finished => "finished",
        Status::Failed => "failed",
    }
}

/// Parse a status from its lowercase name or numeric form code.
pub fn parse_status(raw: &str) -> Option<Status> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "active" | "2" => Some(Status::Active),
        "finished" | "1" => Some(Status::Finished),
        "failed" | "0" => Some(Status::Failed),
        _ => None,
    }
}

pub fn priority_name(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Normal => "normal",
        Priority::High => "high",
    }
}

/// Parse a priority from its lowercase name or numeric form code.
pub fn parse_priority(raw: &str) -> Option<Priority> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "high" | "2" => Some(Priority::High),
        "normal" | "1" => Some(Priority::Normal),
        "low" | "0" => Some(Priority::Low),
        _ => None,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
