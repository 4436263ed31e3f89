//! Focus session engine.
//!
//! A wall-clock state machine over [`PersistedFocusState`]. It owns no
//! timers; callers drive auto-completion through [`FocusEngine::check_auto_complete`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> (stop | auto-complete) -> Idle
//! ```
//!
//! Only one tool runs at a time: starting a tool pauses whichever other
//! tool was running.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use super::catalog::{find_tool, FocusTool};
use super::state::{LastCompletedSession, PersistedFocusState, ToolSessionState};
use crate::clock::{day_key, epoch_ms, local_date, system_now, NowProvider};
use crate::error::{Result, ValidationError};
use crate::events::Event;

/// `max(1, round(total_ms / 60000))`
pub fn minutes_from_ms(total_ms: u64) -> u32 {
    let rounded = total_ms.saturating_add(30_000) / 60_000;
    rounded.clamp(1, u32::MAX as u64) as u32
}

#[derive(Clone)]
pub struct FocusEngine {
    now: NowProvider,
}

impl Default for FocusEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FocusEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusEngine").finish_non_exhaustive()
    }
}

impl FocusEngine {
    pub fn new() -> Self {
        Self { now: system_now() }
    }

    pub fn with_now_provider(mut self, now: NowProvider) -> Self {
        self.now = now;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now_provider(&self) -> NowProvider {
        self.now.clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    pub fn now_ms(&self) -> u64 {
        epoch_ms(self.now())
    }

    pub fn today(&self) -> NaiveDate {
        local_date(self.now())
    }

    pub fn running_tool(&self, state: &PersistedFocusState) -> Option<&'static FocusTool> {
        state.running_tool_id().and_then(find_tool)
    }

    pub fn elapsed_ms(&self, session: &ToolSessionState) -> u64 {
        session.elapsed_ms(self.now_ms())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&self, state: &mut PersistedFocusState, tool_id: &str) -> Result<Option<Event>> {
        self.begin(state, tool_id, None)
    }

    /// Same transition as [`start`](Self::start); a paused tool keeps its banked time.
    pub fn resume(&self, state: &mut PersistedFocusState, tool_id: &str) -> Result<Option<Event>> {
        self.begin(state, tool_id, None)
    }

    pub fn start_with_target(
        &self,
        state: &mut PersistedFocusState,
        tool_id: &str,
        target_ms: u64,
    ) -> Result<Option<Event>> {
        if target_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "target_ms".into(),
                message: "must be positive".into(),
            }
            .into());
        }
        self.begin(state, tool_id, Some(target_ms))
    }

    pub fn pause(&self, state: &mut PersistedFocusState, tool_id: &str) -> Result<Option<Event>> {
        let tool = lookup(tool_id)?;
        let now_ms = self.now_ms();
        let session = state.tool_mut(tool.id);
        if !session.is_running() {
            return Ok(None);
        }
        session.fold(now_ms);
        Ok(Some(Event::FocusPaused {
            tool_id: tool.id.to_string(),
            accumulated_ms: session.accumulated_ms,
            at: self.now(),
        }))
    }

    /// Bank the session into today's history and reset the tool.
    pub fn stop(&self, state: &mut PersistedFocusState, tool_id: &str) -> Result<Option<Event>> {
        let tool = lookup(tool_id)?;
        let session = state.tool(tool.id);
        if !session.has_session() {
            return Ok(None);
        }
        let total_ms = self.elapsed_ms(&session);
        Ok(Some(self.bank(state, tool, total_ms, false)))
    }

    /// Bank a countdown that reached its target. Minutes come from
    /// `min(target, elapsed)` so a late tick never over-credits.
    pub fn check_auto_complete(
        &self,
        state: &mut PersistedFocusState,
        tool_id: &str,
        elapsed_ms: u64,
    ) -> Result<Option<Event>> {
        let tool = lookup(tool_id)?;
        let session = state.tool(tool.id);
        if !session.has_session() {
            debug!(tool = tool.id, "auto-complete for inactive tool ignored");
            return Ok(None);
        }
        let banked_ms = session
            .target_ms
            .map_or(elapsed_ms, |target| target.min(elapsed_ms));
        Ok(Some(self.bank(state, tool, banked_ms, true)))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(
        &self,
        state: &mut PersistedFocusState,
        tool_id: &str,
        target_ms: Option<u64>,
    ) -> Result<Option<Event>> {
        let tool = lookup(tool_id)?;
        if state.tool(tool.id).is_running() {
            return Ok(None);
        }

        let now_ms = self.now_ms();
        for (other_id, other) in state.tools.iter_mut() {
            if other_id != tool.id && other.is_running() {
                other.fold(now_ms);
                debug!(tool = %other_id, "auto-paused to keep a single runner");
            }
        }

        let session = state.tool_mut(tool.id);
        session.started_at = Some(now_ms);
        if let Some(target) = target_ms {
            session.target_ms = Some(target);
        } else if session.target_ms.is_none() {
            session.target_ms = Some(tool.default_duration_ms());
        }

        let at = self.now();
        let event = if session.accumulated_ms > 0 {
            Event::FocusResumed {
                tool_id: tool.id.to_string(),
                accumulated_ms: session.accumulated_ms,
                at,
            }
        } else {
            Event::FocusStarted {
                tool_id: tool.id.to_string(),
                target_ms: session.target_ms,
                accumulated_ms: session.accumulated_ms,
                at,
            }
        };
        Ok(Some(event))
    }

    fn bank(
        &self,
        state: &mut PersistedFocusState,
        tool: &FocusTool,
        total_ms: u64,
        automatic: bool,
    ) -> Event {
        let minutes = minutes_from_ms(total_ms);
        let now = self.now();
        let key = day_key(local_date(now));

        state.history.entry(key.clone()).or_default().add(tool.id, minutes);
        state.last_completed = Some(LastCompletedSession {
            tool_id: tool.id.to_string(),
            minutes,
            day_key: key.clone(),
            finished_at: now,
        });
        state.tool_mut(tool.id).reset();

        Event::FocusCompleted {
            tool_id: tool.id.to_string(),
            minutes,
            day_key: key,
            automatic,
            at: now,
        }
    }
}

fn lookup(tool_id: &str) -> Result<&'static FocusTool> {
    find_tool(tool_id).ok_or_else(|| ValidationError::UnknownTool(tool_id.to_string()).into())
}
