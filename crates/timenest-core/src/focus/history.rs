//! Aggregates over focus history.
//!
//! Everything here is recomputed on read from [`PersistedFocusState`]; nothing
//! is cached.

use chrono::NaiveDate;
use serde::Serialize;

use super::catalog::FOCUS_TOOLS;
use super::state::{LastCompletedSession, PersistedFocusState, ToolStatus};
use crate::clock::day_key;

/// Minimum minutes for a day to count toward the streak.
pub const STREAK_THRESHOLD_MINUTES: u32 = 25;

pub fn today_minutes(state: &PersistedFocusState, today: NaiveDate) -> u32 {
    day_minutes(state, today)
}

pub fn tool_minutes(state: &PersistedFocusState, tool_id: &str, today: NaiveDate) -> u32 {
    state
        .day(&day_key(today))
        .and_then(|entry| entry.by_tool.get(tool_id).copied())
        .unwrap_or(0)
}

/// The last completed session, unless it belongs to an earlier day.
pub fn last_completed_today(
    state: &PersistedFocusState,
    today: NaiveDate,
) -> Option<&LastCompletedSession> {
    let key = day_key(today);
    state
        .last_completed
        .as_ref()
        .filter(|last| last.day_key == key)
}

/// Consecutive qualifying days ending today. Zero when today has not qualified yet.
pub fn streak_days(state: &PersistedFocusState, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while day_minutes(state, day) >= STREAK_THRESHOLD_MINUTES {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

fn day_minutes(state: &PersistedFocusState, day: NaiveDate) -> u32 {
    state
        .day(&day_key(day))
        .map(|entry| entry.total_minutes)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSummary {
    pub id: String,
    pub name: String,
    pub status: ToolStatus,
    pub minutes_today: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningSummary {
    pub tool_id: String,
    pub elapsed_ms: u64,
    pub remaining_ms: Option<u64>,
}

/// Dashboard view of the focus state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusSummary {
    pub day_key: String,
    pub today_minutes: u32,
    pub streak_days: u32,
    pub tools: Vec<ToolSummary>,
    pub running: Option<RunningSummary>,
    pub last_completed: Option<LastCompletedSession>,
}

impl FocusSummary {
    pub fn compute(state: &PersistedFocusState, today: NaiveDate, now_ms: u64) -> Self {
        let tools = FOCUS_TOOLS
            .iter()
            .map(|tool| ToolSummary {
                id: tool.id.to_string(),
                name: tool.name.to_string(),
                status: state.tool(tool.id).status(),
                minutes_today: tool_minutes(state, tool.id, today),
            })
            .collect();

        let running = state.running_tool_id().map(|id| {
            let session = state.tool(id);
            let elapsed_ms = session.elapsed_ms(now_ms);
            RunningSummary {
                tool_id: id.to_string(),
                elapsed_ms,
                remaining_ms: session.target_ms.map(|t| t.saturating_sub(elapsed_ms)),
            }
        });

        Self {
            day_key: day_key(today),
            today_minutes: today_minutes(state, today),
            streak_days: streak_days(state, today),
            tools,
            running,
            last_completed: last_completed_today(state, today).cloned(),
        }
    }
}
