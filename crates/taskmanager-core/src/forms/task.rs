use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{parse_priority, parse_status, priority_name, status_name};
use crate::entities::{TaskFields, TaskRecord};
use crate::error::FormErrors;
use crate::forms::collect_errors;

/// Format used to pre-fill the finish field.
pub const FINISH_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Years that keep the stored RFC 3339 text fixed-width.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Create / edit form for a task. Every field arrives as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaskForm {
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub title: String,
    #[serde(default)]
    pub finish: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub information: String,
}

impl TaskForm {
    /// Pre-populate the edit form from a stored task.
    pub fn from_record(task: &TaskRecord) -> Self {
        Self {
            title: task.title.clone(),
            finish: task
                .finish
                .map(|f| f.format(FINISH_INPUT_FORMAT).to_string())
                .unwrap_or_default(),
            priority: priority_name(task.priority).to_owned(),
            status: status_name(task.status).to_owned(),
            information: task.information.clone(),
        }
    }

    pub fn clean(&self) -> Result<TaskFields, FormErrors> {
        let trimmed = TaskForm {
            title: self.title.trim().to_owned(),
            ..self.clone()
        };
        let mut errors = collect_errors(
            &[
                ("title", trimmed.title.as_str()),
                ("priority", self.priority.as_str()),
                ("status", self.status.as_str()),
                ("information", self.information.as_str()),
            ],
            trimmed.validate(),
        );

        let finish = match parse_finish(&self.finish) {
            Ok(finish) => finish,
            Err(()) => {
                errors.add("finish", "Enter a valid date/time.");
                None
            }
        };
        let priority = parse_priority(&self.priority);
        if priority.is_none() && !errors.contains("priority") {
            errors.add("priority", "Select a valid choice.");
        }
        let status = parse_status(&self.status);
        if status.is_none() && !errors.contains("status") {
            errors.add("status", "Select a valid choice.");
        }

        match (priority, status) {
            (Some(priority), Some(status)) if errors.is_empty() => Ok(TaskFields {
                title: self.title.trim().to_owned(),
                finish,
                priority,
                status,
                information: self.information.trim().to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// Parse the optional finish field. Blank is `None`; naive values are UTC.
/// Years outside `0000..=9999` are rejected.
pub fn parse_finish(raw: &str) -> Result<Option<DateTime<Utc>>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let parsed = parse_timestamp(raw).ok_or(())?;
    if YEAR_RANGE.contains(&parsed.year()) { Ok(Some(parsed)) } else { Err(()) }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::{Priority, Status};
    use chrono::TimeZone;

    fn valid() -> TaskForm {
        TaskForm {
            title: "task tester".into(),
            finish: "2021-06-10 08:00".into(),
            priority: "2".into(),
            status: "2".into(),
            information: "text".into(),
        }
    }

    #[test]
    fn valid_form_cleans_into_fields() {
        let fields = valid().clean().unwrap();
        assert_eq!(fields.title, "task tester");
        assert_eq!(fields.priority, Priority::High);
        assert_eq!(fields.status, Status::Active);
        assert_eq!(fields.finish, Some(Utc.with_ymd_and_hms(2021, 6, 10, 8, 0, 0).unwrap()));
    }

    #[test]
    fn missing_information_is_reported() {
        let form = TaskForm { information: String::new(), ..valid() };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("information"), [crate::forms::REQUIRED.to_owned()]);
    }

    #[test]
    fn missing_status_is_reported() {
        let form = TaskForm { status: String::new(), ..valid() };
        let errors = form.clean().unwrap_err();
        assert!(errors.contains("status"));
        assert!(!errors.contains("priority"));
    }

    #[test]
    fn unknown_choice_is_reported() {
        let form = TaskForm { priority: "urgent".into(), ..valid() };
        assert_eq!(form.clean().unwrap_err().get("priority"), ["Select a valid choice.".to_owned()]);
    }

    #[test]
    fn overlong_title_is_reported() {
        let form = TaskForm { title: "x".repeat(101), ..valid() };
        assert!(form.clean().unwrap_err().contains("title"));
        let form = TaskForm { title: "x".repeat(100), ..valid() };
        assert!(form.clean().is_ok());
    }

    #[test]
    fn title_length_counts_the_trimmed_value() {
        let form = TaskForm { title: format!("{} ", "x".repeat(100)), ..valid() };
        assert_eq!(form.clean().unwrap().title, "x".repeat(100));
    }

    #[test]
    fn finish_year_must_have_four_digits() {
        for raw in ["+10000-01-01 00:00", "-0001-01-01 00:00", "+10000-01-01T00:00:00Z"] {
            assert_eq!(parse_finish(raw), Err(()), "{raw}");
            let form = TaskForm { finish: raw.into(), ..valid() };
            assert_eq!(form.clean().unwrap_err().get("finish"), ["Enter a valid date/time.".to_owned()]);
        }
        assert!(parse_finish("9999-12-31 23:59").unwrap().is_some());
        assert!(parse_finish("0000-01-01 00:00").unwrap().is_some());
    }

    #[test]
    fn prefilled_finish_keeps_seconds() {
        let record = TaskRecord {
            id: "abc12345".into(),
            title: "done".into(),
            pub_date: Utc::now(),
            finish: Some(Utc.with_ymd_and_hms(2021, 6, 10, 8, 0, 42).unwrap()),
            priority: Priority::Normal,
            status: Status::Finished,
            information: "text".into(),
            owner_id: 1,
        };
        let form = TaskForm::from_record(&record);
        assert_eq!(form.finish, "2021-06-10 08:00:42");
        assert_eq!(form.clean().unwrap().finish, record.finish);
    }

    #[test]
    fn blank_finish_is_none_and_garbage_is_an_error() {
        let form = TaskForm { finish: "  ".into(), ..valid() };
        assert_eq!(form.clean().unwrap().finish, None);
        let form = TaskForm { finish: "tomorrow".into(), ..valid() };
        assert!(form.clean().unwrap_err().contains("finish"));
    }

    #[test]
    fn finish_accepts_common_formats() {
        let expected = Utc.with_ymd_and_hms(2021, 6, 10, 8, 0, 0).unwrap();
        for raw in [
            "2021-06-10 08:00",
            "2021-06-10 08:00:00",
            "2021-06-10T08:00",
            "2021-06-10T08:00:00+00:00",
            "2021-06-10T10:00:00+02:00",
        ] {
            assert_eq!(parse_finish(raw), Ok(Some(expected)), "{raw}");
        }
        assert_eq!(
            parse_finish("2021-06-10"),
            Ok(Some(Utc.with_ymd_and_hms(2021, 6, 10, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn from_record_round_trips_through_clean() {
        let record = TaskRecord {
            id: "abc12345".into(),
            title: "first task".into(),
            pub_date: Utc::now(),
            finish: Some(Utc.with_ymd_and_hms(2021, 6, 10, 8, 0, 0).unwrap()),
            priority: Priority::Normal,
            status: Status::Failed,
            information: "test example".into(),
            owner_id: 1,
        };
        let fields = TaskForm::from_record(&record).clean().unwrap();
        assert_eq!(fields.title, record.title);
        assert_eq!(fields.finish, record.finish);
        assert_eq!(fields.priority, record.priority);
        assert_eq!(fields.status, record.status);
    }
}
