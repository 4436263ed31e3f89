use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::catalog::{find_tool, FocusTool};
use super::engine::FocusEngine;
use super::history::FocusSummary;
use super::state::PersistedFocusState;
use super::ticker::{FocusTicker, TickObserver, TimerDisplay};
use crate::error::Result;
use crate::events::Event;
use crate::storage::FocusStore;

/// Receives what a session view would render.
pub trait FocusDisplay: Send + Sync + 'static {
    fn on_tick(&self, _tool: &FocusTool, _display: &TimerDisplay) {}
    fn on_event(&self, _event: &Event) {}
}

/// Display that ignores everything.
pub struct NullDisplay;

impl FocusDisplay for NullDisplay {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAction {
    Start,
    /// Start with an explicit countdown target in milliseconds.
    StartFor(u64),
    Resume,
    Pause,
    Stop,
}

/// Ties the persisted state, the engine and the ticker together.
pub struct FocusController {
    shared: Arc<Shared>,
    ticker: Mutex<FocusTicker>,
}

struct Shared {
    store: Mutex<FocusStore>,
    engine: FocusEngine,
    display: Arc<dyn FocusDisplay>,
}

impl Shared {
    fn mutate<T>(
        &self,
        f: impl FnOnce(&FocusEngine, &mut PersistedFocusState) -> Result<T>,
    ) -> Result<T> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = store.load();
        let out = f(&self.engine, &mut state)?;
        store.save(&state)?;
        Ok(out)
    }

    fn load(&self) -> PersistedFocusState {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .load()
    }
}

impl TickObserver for Shared {
    fn on_tick(&self, tool_id: &str, display: &TimerDisplay) {
        if let Some(tool) = find_tool(tool_id) {
            self.display.on_tick(tool, display);
        }
    }

    fn on_complete(&self, tool_id: &str, elapsed_ms: u64) {
        // The ticker's snapshot may predate a pause written by another process.
        let result = self.mutate(|engine, state| {
            let fresh_ms = engine.elapsed_ms(&state.tool(tool_id));
            engine.check_auto_complete(state, tool_id, elapsed_ms.min(fresh_ms))
        });
        match result {
            Ok(Some(event)) => {
                info!(tool = tool_id, "focus session completed");
                self.display.on_event(&event);
            }
            Ok(None) => debug!(tool = tool_id, "completion already banked"),
            Err(e) => warn!(tool = tool_id, "failed to bank completed session: {e}"),
        }
    }
}

impl FocusController {
    pub fn new(
        store: FocusStore,
        engine: FocusEngine,
        tick_interval: Duration,
        display: Arc<dyn FocusDisplay>,
    ) -> Self {
        let ticker = FocusTicker::new(tick_interval).with_now_provider(engine.now_provider());
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(store),
                engine,
                display,
            }),
            ticker: Mutex::new(ticker),
        }
    }

    pub fn engine(&self) -> &FocusEngine {
        &self.shared.engine
    }

    pub fn state(&self) -> PersistedFocusState {
        self.shared.load()
    }

    pub fn summary(&self) -> FocusSummary {
        let engine = &self.shared.engine;
        FocusSummary::compute(&self.shared.load(), engine.today(), engine.now_ms())
    }

    /// Apply `action` to `tool_id`, persist, and resync the ticker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn apply(&self, action: FocusAction, tool_id: &str) -> Result<Option<Event>> {
        let event = self.shared.mutate(|engine, state| match action {
            FocusAction::Start => engine.start(state, tool_id),
            FocusAction::StartFor(target_ms) => engine.start_with_target(state, tool_id, target_ms),
            FocusAction::Resume => engine.resume(state, tool_id),
            FocusAction::Pause => engine.pause(state, tool_id),
            FocusAction::Stop => engine.stop(state, tool_id),
        })?;
        if let Some(event) = &event {
            self.shared.display.on_event(event);
        }
        self.sync_ticker()?;
        Ok(event)
    }

    /// Point the ticker at whichever tool is running, or stop it.
    pub fn sync_ticker(&self) -> Result<()> {
        let running = self.shared.mutate(|_, state| {
            let Some(id) = state.running_tool_id().map(str::to_string) else {
                return Ok(None);
            };
            let Some(tool) = find_tool(&id) else {
                return Ok(None);
            };
            let session = state.tool_mut(tool.id);
            if session.target_ms.is_none() {
                session.target_ms = Some(tool.default_duration_ms());
            }
            Ok(Some((tool.id, session.clone())))
        })?;

        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        match running {
            Some((tool_id, session)) => {
                let observer: Arc<dyn TickObserver> = self.shared.clone();
                ticker.start(tool_id, session, observer);
            }
            None => ticker.stop(),
        }
        Ok(())
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_active()
    }

    pub fn stop_ticker(&self) {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{day_key, ManualClock};
    use crate::storage::Database;
    use chrono::{TimeZone, Utc};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Event>>,
        ticks: Mutex<u32>,
    }

    impl FocusDisplay for Recorder {
        fn on_tick(&self, _tool: &FocusTool, _display: &TimerDisplay) {
            *self.ticks.lock().unwrap() += 1;
        }

        fn on_event(&self, event: &Event) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn controller(clock: &ManualClock, display: Arc<Recorder>) -> FocusController {
        let store = FocusStore::new(Database::open_memory().unwrap());
        let engine = FocusEngine::new().with_now_provider(clock.provider());
        FocusController::new(store, engine, Duration::from_millis(5), display)
    }

    #[tokio::test]
    async fn countdown_auto_completes_into_history() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 12, 12, 0, 0).unwrap());
        let display = Arc::new(Recorder::default());
        let ctl = controller(&clock, display.clone());

        ctl.apply(FocusAction::StartFor(60_000), "break-reminders").unwrap();
        assert!(ctl.is_ticking());

        clock.advance(chrono::Duration::seconds(61));
        for _ in 0..100 {
            if !ctl.is_ticking() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let state = ctl.state();
        let today = day_key(ctl.engine().today());
        assert_eq!(state.history[&today].by_tool["break-reminders"], 1);
        assert!(!state.tool("break-reminders").has_session());

        let events = display.events.lock().unwrap().clone();
        assert!(matches!(events.first(), Some(Event::FocusStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(Event::FocusCompleted { automatic: true, minutes: 1, .. })
        ));
        assert!(*display.ticks.lock().unwrap() >= 1);
    }

    #[tokio::test]
    async fn pause_stops_the_ticker() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 12, 12, 0, 0).unwrap());
        let ctl = controller(&clock, Arc::new(Recorder::default()));

        ctl.apply(FocusAction::Start, "pomodoro").unwrap();
        assert!(ctl.is_ticking());
        clock.advance(chrono::Duration::seconds(40));
        ctl.apply(FocusAction::Pause, "pomodoro").unwrap();
        assert!(!ctl.is_ticking());

        let event = ctl.apply(FocusAction::Stop, "pomodoro").unwrap();
        assert!(matches!(event, Some(Event::FocusCompleted { minutes: 1, .. })));
        assert_eq!(ctl.summary().today_minutes, 1);
    }

    #[tokio::test]
    async fn completion_never_credits_more_than_the_stored_session() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 12, 12, 0, 0).unwrap());
        let ctl = controller(&clock, Arc::new(Recorder::default()));

        ctl.apply(FocusAction::StartFor(30 * 60_000), "pomodoro").unwrap();
        clock.advance(chrono::Duration::minutes(10));
        ctl.apply(FocusAction::Pause, "pomodoro").unwrap();

        // A ticker started before the pause reports the full target.
        ctl.shared.on_complete("pomodoro", 30 * 60_000);

        let state = ctl.state();
        let today = day_key(ctl.engine().today());
        assert_eq!(state.history[&today].by_tool["pomodoro"], 10);
        assert!(!state.tool("pomodoro").has_session());
    }

    #[tokio::test]
    async fn sync_initializes_missing_target() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 12, 12, 0, 0).unwrap());
        let db = Database::open_memory().unwrap();
        db.kv_set(
            crate::storage::FOCUS_STATE_KEY,
            r#"{"tools":{"deep-focus":{"accumulatedMs":0,"startedAt":1736683200000,"targetMs":null}}}"#,
        )
        .unwrap();
        let engine = FocusEngine::new().with_now_provider(clock.provider());
        let ctl = FocusController::new(
            FocusStore::new(db),
            engine,
            Duration::from_millis(5),
            Arc::new(NullDisplay),
        );

        ctl.sync_ticker().unwrap();
        assert_eq!(ctl.state().tool("deep-focus").target_ms, Some(45 * 60_000));
        assert!(ctl.is_ticking());
        ctl.stop_ticker();
        assert!(!ctl.is_ticking());
    }
}
