//! # TimeNest Core Library
//!
//! Core logic for TimeNest: focus tools with timed sessions and history, and
//! due-date reminders for tasks kept in a remote task store. The `timenest`
//! CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Focus**: A wall-clock state machine over a persisted blob, plus a
//!   tokio ticker that drives countdowns to auto-completion
//! - **Reminders**: A polling scheduler that fires each due-date threshold
//!   at most once per task
//! - **Notify**: Desktop notifications and text-to-speech behind traits
//! - **Storage**: SQLite key-value store and TOML configuration
//! - **Tasks**: REST client for the task store
//!
//! ## Key Components
//!
//! - [`FocusEngine`]: Focus session state machine
//! - [`FocusController`]: Engine + persistence + live ticker
//! - [`ReminderScheduler`]: Due-date reminder loop
//! - [`NotificationDispatcher`]: Permission and preference gating for delivery
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod credentials;
pub mod error;
pub mod events;
pub mod focus;
pub mod notify;
pub mod reminders;
pub mod storage;
pub mod tasks;

pub use clock::{ManualClock, NowProvider};
pub use error::{
    ConfigError, CoreError, DatabaseError, NotifyError, TaskStoreError, ValidationError,
};
pub use events::Event;
pub use focus::{
    FocusAction, FocusController, FocusDisplay, FocusEngine, FocusSummary, FocusTool,
    PersistedFocusState, FOCUS_TOOLS,
};
pub use notify::{NotificationDispatcher, Permission};
pub use reminders::{Reminder, ReminderScheduler, SchedulerConfig, SchedulerHandle, ThresholdKind};
pub use storage::{Config, Database, FocusStore, ReminderSettings, SettingsStore};
pub use tasks::{HttpTaskStore, Task, TaskStats, TaskStore};
