//! View models handed to the page templates.

pub mod task;

pub use task::{priority_choices, status_choices, Choice, TaskView};
