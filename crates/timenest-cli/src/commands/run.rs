//! Long-running mode: reminder polling plus the focus countdown.
//!
//! Events are written to stdout as one JSON object per line.

use std::sync::Arc;
use std::time::Duration;

use timenest_core::focus::{PersistedFocusState, TimerDisplay, ToolSessionState};
use timenest_core::storage::{Database, SettingsStore};
use timenest_core::{Event, FocusDisplay, FocusTool};
use tracing::{info, trace, warn};

use super::{focus_controller, load_config, scheduler, CliResult};

/// Focus state and reminder toggles written by other `timenest` invocations
/// are picked up this often.
const RESYNC: Duration = Duration::from_secs(5);

fn emit(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!("failed to encode event: {e}"),
    }
}

struct EventLines;

impl FocusDisplay for EventLines {
    fn on_tick(&self, tool: &FocusTool, timer: &TimerDisplay) {
        trace!(tool = tool.id, remaining = %timer.clock_label(), "tick");
    }

    fn on_event(&self, event: &Event) {
        emit(event);
    }
}

fn running_session(state: &PersistedFocusState) -> Option<(String, ToolSessionState)> {
    state
        .running_tool_id()
        .map(|id| (id.to_string(), state.tool(id)))
}

pub async fn run() -> CliResult {
    let config = load_config()?;

    let scheduler = Arc::new(scheduler(&config)?.with_event_sink(Arc::new(|event: Event| emit(&event))));
    let settings = SettingsStore::new(Database::open()?);
    let mut reminders = scheduler.spawn();
    if reminders.is_none() {
        warn!("reminders disabled: no notification or speech backend");
    }

    let controller = focus_controller(&config, Arc::new(EventLines))?;
    controller.sync_ticker()?;
    let mut watched = running_session(&controller.state());

    info!("timenest running");
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut resync = tokio::time::interval(RESYNC);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                break;
            }
            _ = resync.tick() => {
                scheduler.dispatcher().set_settings(settings.load());
                let current = running_session(&controller.state());
                if current != watched {
                    controller.sync_ticker()?;
                    watched = running_session(&controller.state());
                }
            }
        }
    }

    controller.stop_ticker();
    if let Some(handle) = reminders.as_mut() {
        handle.stop();
    }
    info!("timenest stopped");
    Ok(())
}
