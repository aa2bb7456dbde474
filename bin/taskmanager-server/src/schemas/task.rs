use serde::Serialize;
use strum::IntoEnumIterator;
use taskmanager_core::domain::{priority_name, status_name, Priority, Status};
use taskmanager_core::entities::TaskRecord;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: String,
}

impl Choice {
    fn new(value: &'static str) -> Self {
        let mut chars = value.chars();
        let label = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self { value, label }
    }
}

pub fn priority_choices() -> Vec<Choice> {
    Priority::iter().map(|p| Choice::new(priority_name(p))).collect()
}

pub fn status_choices() -> Vec<Choice> {
    Status::iter().map(|s| Choice::new(status_name(s))).collect()
}

/// A task row as the list page shows it.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub pub_date: String,
    pub finish: Option<String>,
    pub priority: &'static str,
    pub status: &'static str,
    pub information: String,
}

impl From<&TaskRecord> for TaskView {
    fn from(task: &TaskRecord) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            pub_date: task.pub_date.format(DISPLAY_FORMAT).to_string(),
            finish: task.finish.map(|f| f.format(DISPLAY_FORMAT).to_string()),
            priority: priority_name(task.priority),
            status: status_name(task.status),
            information: task.information.clone(),
        }
    }
}
