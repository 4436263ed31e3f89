//! Human-readable reminder text.

use chrono::{DateTime, Local, Utc};

use super::threshold::ThresholdKind;
use crate::tasks::Task;

pub const DUE_SOON_TITLE: &str = "📌 Task due soon";
pub const DUE_NOW_TITLE: &str = "⏰ Task due now";
pub const TEST_TITLE: &str = "⏰ TimeNest test reminder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDescription {
    /// `Today` or `Tomorrow` when applicable.
    pub day_word: Option<&'static str>,
    /// e.g. `Sun, Jan 12, 2025`
    pub date_label: String,
    /// e.g. `2:30 PM`
    pub time_label: String,
}

impl DueDescription {
    pub fn day_part(&self) -> &str {
        match self.day_word {
            Some(word) => word,
            None => &self.date_label,
        }
    }
}

pub fn time_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-I:%M %p").to_string()
}

/// Describe `due` relative to `now`, both read in local time.
pub fn describe_due(due: DateTime<Utc>, now: DateTime<Utc>) -> DueDescription {
    let due_local = due.with_timezone(&Local);
    let today = now.with_timezone(&Local).date_naive();
    let due_day = due_local.date_naive();

    let day_word = if due_day == today {
        Some("Today")
    } else if today.succ_opt() == Some(due_day) {
        Some("Tomorrow")
    } else {
        None
    };

    DueDescription {
        day_word,
        date_label: due_local.format("%a, %b %-d, %Y").to_string(),
        time_label: time_label(due),
    }
}

/// Text for one reminder: notification title, body, and spoken line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderText {
    pub title: String,
    pub body: String,
    pub speech: String,
}

pub fn reminder_text(
    task: &Task,
    kind: ThresholdKind,
    due: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ReminderText {
    let description = describe_due(due, now);
    let name = task.display_title();
    let body = format!(
        "Task \"{name}\" is due {} at {}.",
        description.day_part(),
        description.time_label
    );

    match kind {
        ThresholdKind::DueNow => ReminderText {
            title: DUE_NOW_TITLE.to_string(),
            body,
            speech: format!("Your task {name} is due at {}.", description.time_label),
        },
        ThresholdKind::Due15 | ThresholdKind::Due5 => ReminderText {
            title: DUE_SOON_TITLE.to_string(),
            body,
            speech: format!(
                "Your task {name} is remaining. It is due in {}.",
                minutes_phrase(kind.minutes_before())
            ),
        },
    }
}

pub fn test_text(now: DateTime<Utc>) -> ReminderText {
    let at = time_label(now);
    ReminderText {
        title: TEST_TITLE.to_string(),
        body: format!("This is a test reminder at {at}."),
        speech: format!("This is a TimeNest test reminder at {at}."),
    }
}

fn minutes_phrase(minutes: i64) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Local
            .from_local_datetime(&NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn task(title: &str) -> Task {
        Task {
            id: "t1".into(),
            title: title.into(),
            ..Task::default()
        }
    }

    #[test]
    fn today_and_tomorrow_words() {
        let now = local(2025, 1, 12, 9, 0);
        assert_eq!(describe_due(local(2025, 1, 12, 14, 30), now).day_word, Some("Today"));
        assert_eq!(describe_due(local(2025, 1, 13, 8, 0), now).day_word, Some("Tomorrow"));

        let later = describe_due(local(2025, 1, 19, 8, 5), now);
        assert_eq!(later.day_word, None);
        assert_eq!(later.date_label, "Sun, Jan 19, 2025");
        assert_eq!(later.day_part(), "Sun, Jan 19, 2025");
        assert_eq!(later.time_label, "8:05 AM");
    }

    #[test]
    fn due_soon_text() {
        let now = local(2025, 1, 12, 14, 15);
        let text = reminder_text(&task("Pay rent"), ThresholdKind::Due15, now + Duration::minutes(15), now);
        assert_eq!(text.title, "📌 Task due soon");
        assert_eq!(text.body, "Task \"Pay rent\" is due Today at 2:30 PM.");
        assert_eq!(text.speech, "Your task Pay rent is remaining. It is due in 15 minutes.");
    }

    #[test]
    fn due_now_text_for_untitled_task() {
        let now = local(2025, 1, 12, 14, 30);
        let text = reminder_text(&task(""), ThresholdKind::DueNow, now, now);
        assert_eq!(text.title, "⏰ Task due now");
        assert_eq!(text.body, "Task \"Task\" is due Today at 2:30 PM.");
        assert_eq!(text.speech, "Your task Task is due at 2:30 PM.");
    }

    #[test]
    fn test_reminder_text() {
        let text = test_text(local(2025, 1, 12, 9, 7));
        assert_eq!(text.body, "This is a test reminder at 9:07 AM.");
        assert_eq!(text.speech, "This is a TimeNest test reminder at 9:07 AM.");
    }
}
