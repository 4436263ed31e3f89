use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reminders::ThresholdKind;

/// Every state change in the system produces an Event.
/// The CLI prints them; observers subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    FocusStarted {
        tool_id: String,
        target_ms: Option<u64>,
        accumulated_ms: u64,
        at: DateTime<Utc>,
    },
    FocusResumed {
        tool_id: String,
        accumulated_ms: u64,
        at: DateTime<Utc>,
    },
    FocusPaused {
        tool_id: String,
        accumulated_ms: u64,
        at: DateTime<Utc>,
    },
    /// A session was banked into today's history.
    FocusCompleted {
        tool_id: String,
        minutes: u32,
        day_key: String,
        /// True when the countdown reached its target on its own.
        automatic: bool,
        at: DateTime<Utc>,
    },
    ReminderSent {
        task_id: String,
        kind: ThresholdKind,
        title: String,
        at: DateTime<Utc>,
    },
}
