use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("expected low, medium or high, got '{other}'"),
            }),
        }
    }
}

/// A task as returned by the task store.
///
/// Date and time fields are kept as the server sent them; use the accessor
/// methods for parsed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Title for display, `Task` when blank.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Task"
        } else {
            title
        }
    }

    /// Unrecognized priorities read as none.
    pub fn priority(&self) -> Option<Priority> {
        self.priority.as_deref().and_then(|p| p.parse().ok())
    }

    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_due_date)
    }

    pub fn due_clock(&self) -> Option<NaiveTime> {
        self.due_time.as_deref().and_then(parse_due_time)
    }

    /// Due date combined with due time in the local timezone.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        let naive = self.due_day()?.and_time(self.due_clock()?);
        local_instant(naive)
    }

    /// Whether reminders may fire for this task.
    pub fn is_reminder_eligible(&self) -> bool {
        !self.id.trim().is_empty() && !self.completed && self.due_at().is_some()
    }
}

/// Accepts `YYYY-MM-DD`, ISO-8601 date-times, and RFC 2822 date-times.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc2822(raw).ok().map(|dt| dt.date_naive())
}

/// Accepts `HH:MM` and `HH:MM:SS` (24 hour).
pub fn parse_due_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn local_instant(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    // Ambiguous local times (DST fall-back) take the earlier instant.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".into(),
                message: "Title is required".into(),
            });
        }
        validate_due(self.due_date.as_deref(), self.due_time.as_deref())
    }
}

/// Partial update; only `Some` fields are sent.
///
/// `due_date`/`due_time` use a nested option so they can be cleared:
/// `Some(None)` sends `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<Option<String>>,
}

impl TaskUpdate {
    pub fn completed(done: bool) -> Self {
        Self {
            completed: Some(done),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "update".into(),
                message: "No valid fields to update".into(),
            });
        }
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::InvalidValue {
                field: "title".into(),
                message: "Title is required".into(),
            });
        }
        validate_due(
            self.due_date.as_ref().and_then(Option::as_deref),
            self.due_time.as_ref().and_then(Option::as_deref),
        )
    }
}

fn validate_due(date: Option<&str>, time: Option<&str>) -> Result<(), ValidationError> {
    if let Some(date) = date.filter(|d| !d.trim().is_empty()) {
        if parse_due_date(date).is_none() {
            return Err(ValidationError::InvalidValue {
                field: "due_date".into(),
                message: format!("unrecognized date '{date}'"),
            });
        }
    }
    if let Some(time) = time.filter(|t| !t.trim().is_empty()) {
        if parse_due_time(time).is_none() {
            return Err(ValidationError::InvalidValue {
                field: "due_time".into(),
                message: format!("expected HH:MM, got '{time}'"),
            });
        }
    }
    Ok(())
}
