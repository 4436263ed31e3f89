//! Task due-date reminders.

pub mod message;
mod scheduler;
mod threshold;

pub use scheduler::{EventSink, Reminder, ReminderScheduler, SchedulerConfig, SchedulerHandle};
pub use threshold::ThresholdKind;
