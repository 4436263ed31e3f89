//! Focus tools: session state machine, history aggregates and the live ticker.

mod catalog;
mod controller;
mod engine;
pub mod history;
mod state;
mod ticker;

pub use catalog::{find_tool, FocusTool, FOCUS_TOOLS};
pub use controller::{FocusAction, FocusController, FocusDisplay, NullDisplay};
pub use engine::{minutes_from_ms, FocusEngine};
pub use history::{FocusSummary, STREAK_THRESHOLD_MINUTES};
pub use state::{
    DayHistoryEntry, LastCompletedSession, PersistedFocusState, ToolSessionState, ToolStatus,
};
pub use ticker::{format_mmss, FocusTicker, TickObserver, TimerDisplay};
