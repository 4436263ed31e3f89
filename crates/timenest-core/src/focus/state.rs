use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-tool session bookkeeping. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSessionState {
    #[serde(default)]
    pub accumulated_ms: u64,
    #[serde(default)]
    pub started_at: Option<u64>,
    #[serde(default)]
    pub target_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Idle,
    Running,
    Paused,
}

impl ToolSessionState {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// A session exists once the tool has been started and not yet banked.
    pub fn has_session(&self) -> bool {
        self.is_running() || self.accumulated_ms > 0
    }

    pub fn status(&self) -> ToolStatus {
        if self.is_running() {
            ToolStatus::Running
        } else if self.accumulated_ms > 0 {
            ToolStatus::Paused
        } else {
            ToolStatus::Idle
        }
    }

    /// Banked time plus the live span since `started_at`.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let live = self
            .started_at
            .map(|started| now_ms.saturating_sub(started))
            .unwrap_or(0);
        self.accumulated_ms.saturating_add(live)
    }

    /// Fold the live span into `accumulated_ms` and clear `started_at`.
    pub(crate) fn fold(&mut self, now_ms: u64) {
        self.accumulated_ms = self.elapsed_ms(now_ms);
        self.started_at = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = ToolSessionState::default();
    }
}

/// Minutes banked on one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHistoryEntry {
    #[serde(default)]
    pub total_minutes: u32,
    #[serde(default)]
    pub by_tool: BTreeMap<String, u32>,
}

impl DayHistoryEntry {
    pub(crate) fn add(&mut self, tool_id: &str, minutes: u32) {
        self.total_minutes = self.total_minutes.saturating_add(minutes);
        let slot = self.by_tool.entry(tool_id.to_string()).or_insert(0);
        *slot = slot.saturating_add(minutes);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastCompletedSession {
    pub tool_id: String,
    pub minutes: u32,
    /// Older blobs call this field `key`.
    #[serde(alias = "key")]
    pub day_key: String,
    pub finished_at: DateTime<Utc>,
}

/// Everything the focus engine persists under a single key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFocusState {
    #[serde(default)]
    pub tools: BTreeMap<String, ToolSessionState>,
    #[serde(default)]
    pub history: BTreeMap<String, DayHistoryEntry>,
    #[serde(default)]
    pub last_completed: Option<LastCompletedSession>,
}

impl PersistedFocusState {
    /// Session state for `tool_id`, or an idle one if none is stored.
    pub fn tool(&self, tool_id: &str) -> ToolSessionState {
        self.tools.get(tool_id).cloned().unwrap_or_default()
    }

    pub(crate) fn tool_mut(&mut self, tool_id: &str) -> &mut ToolSessionState {
        self.tools.entry(tool_id.to_string()).or_default()
    }

    /// The first running tool, if any.
    pub fn running_tool_id(&self) -> Option<&str> {
        self.tools
            .iter()
            .find(|(_, session)| session.is_running())
            .map(|(id, _)| id.as_str())
    }

    pub fn day(&self, day_key: &str) -> Option<&DayHistoryEntry> {
        self.history.get(day_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_adds_live_span() {
        let session = ToolSessionState {
            accumulated_ms: 5_000,
            started_at: Some(10_000),
            target_ms: None,
        };
        assert_eq!(session.elapsed_ms(12_500), 7_500);
        // Clock went backwards: live span clamps to zero.
        assert_eq!(session.elapsed_ms(9_000), 5_000);
    }

    #[test]
    fn status_transitions() {
        let mut session = ToolSessionState::default();
        assert_eq!(session.status(), ToolStatus::Idle);
        session.started_at = Some(1);
        assert_eq!(session.status(), ToolStatus::Running);
        session.fold(61);
        assert_eq!(session.status(), ToolStatus::Paused);
        assert_eq!(session.accumulated_ms, 60);
    }

    #[test]
    fn reads_legacy_blob() {
        let raw = r#"{
            "tools": {
                "pomodoro": { "accumulatedMs": 1200, "startedAt": null, "targetMs": 1500000 },
                "deep-focus": {}
            },
            "history": {
                "2025-01-12": { "totalMinutes": 30, "byTool": { "pomodoro": 30 } }
            },
            "lastCompleted": {
                "toolId": "pomodoro",
                "minutes": 30,
                "key": "2025-01-12",
                "finishedAt": "2025-01-12T10:00:00.000Z"
            }
        }"#;
        let state: PersistedFocusState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.tool("pomodoro").accumulated_ms, 1200);
        assert_eq!(state.tool("deep-focus"), ToolSessionState::default());
        assert_eq!(state.history["2025-01-12"].total_minutes, 30);
        assert_eq!(state.last_completed.unwrap().day_key, "2025-01-12");
    }

    #[test]
    fn missing_sections_default() {
        let state: PersistedFocusState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, PersistedFocusState::default());
        assert!(state.running_tool_id().is_none());
    }
}
