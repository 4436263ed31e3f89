use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::state::ToolSessionState;
use crate::clock::{epoch_ms, system_now, NowProvider};

/// What the session display shows on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerDisplay {
    pub elapsed_ms: u64,
    /// `None` for untimed sessions, which count up instead.
    pub remaining_ms: Option<u64>,
    pub finished: bool,
}

impl TimerDisplay {
    pub fn compute(session: &ToolSessionState, now_ms: u64) -> Self {
        let elapsed_ms = session.elapsed_ms(now_ms);
        let remaining_ms = session
            .target_ms
            .map(|target| target.saturating_sub(elapsed_ms));
        Self {
            elapsed_ms,
            remaining_ms,
            finished: remaining_ms == Some(0),
        }
    }

    /// `MM:SS` of the remaining time, or of the elapsed time when untimed.
    pub fn clock_label(&self) -> String {
        format_mmss(self.remaining_ms.unwrap_or(self.elapsed_ms))
    }
}

pub fn format_mmss(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Receives tick updates from a [`FocusTicker`].
pub trait TickObserver: Send + Sync + 'static {
    fn on_tick(&self, tool_id: &str, display: &TimerDisplay);

    /// Called once when a countdown reaches zero. The ticker stops afterwards.
    fn on_complete(&self, tool_id: &str, elapsed_ms: u64);
}

/// Drives the once-per-interval display refresh for the running tool.
///
/// At most one task is alive per ticker. Starting again replaces the previous
/// task, and dropping the ticker aborts it.
pub struct FocusTicker {
    interval: Duration,
    now: NowProvider,
    task: Option<JoinHandle<()>>,
}

impl FocusTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            now: system_now(),
            task: None,
        }
    }

    pub fn with_now_provider(mut self, now: NowProvider) -> Self {
        self.now = now;
        self
    }

    /// Spawn the tick loop for `session`. Must be called inside a tokio runtime.
    pub fn start(
        &mut self,
        tool_id: impl Into<String>,
        session: ToolSessionState,
        observer: Arc<dyn TickObserver>,
    ) {
        self.stop();

        let tool_id = tool_id.into();
        let now = self.now.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let display = TimerDisplay::compute(&session, epoch_ms(now()));
                observer.on_tick(&tool_id, &display);
                if display.finished {
                    observer.on_complete(&tool_id, display.elapsed_ms);
                    break;
                }
            }
        });
        self.task = Some(handle);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for FocusTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        ticks: Mutex<Vec<TimerDisplay>>,
        completions: Mutex<Vec<(String, u64)>>,
    }

    impl TickObserver for Recorder {
        fn on_tick(&self, _tool_id: &str, display: &TimerDisplay) {
            self.ticks.lock().unwrap().push(*display);
        }

        fn on_complete(&self, tool_id: &str, elapsed_ms: u64) {
            self.completions
                .lock()
                .unwrap()
                .push((tool_id.to_string(), elapsed_ms));
        }
    }

    fn running(started_at: u64, target_ms: Option<u64>) -> ToolSessionState {
        ToolSessionState {
            accumulated_ms: 0,
            started_at: Some(started_at),
            target_ms,
        }
    }

    #[test]
    fn countdown_display() {
        let session = running(0, Some(60_000));
        let display = TimerDisplay::compute(&session, 15_500);
        assert_eq!(display.remaining_ms, Some(44_500));
        assert!(!display.finished);
        assert_eq!(display.clock_label(), "00:44");

        let done = TimerDisplay::compute(&session, 63_000);
        assert_eq!(done.remaining_ms, Some(0));
        assert!(done.finished);
    }

    #[test]
    fn untimed_display_counts_up() {
        let session = running(0, None);
        let display = TimerDisplay::compute(&session, 125_000);
        assert_eq!(display.remaining_ms, None);
        assert!(!display.finished);
        assert_eq!(display.clock_label(), "02:05");
    }

    #[tokio::test]
    async fn completes_exactly_once_past_target() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 12, 12, 0, 0).unwrap());
        let started = epoch_ms(clock.now());
        clock.advance(chrono::Duration::milliseconds(1_503_000));

        let recorder = Arc::new(Recorder::default());
        let mut ticker =
            FocusTicker::new(Duration::from_millis(5)).with_now_provider(clock.provider());
        ticker.start("pomodoro", running(started, Some(1_500_000)), recorder.clone());

        for _ in 0..50 {
            if !ticker.is_active() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        let completions = recorder.completions.lock().unwrap().clone();
        assert_eq!(completions, vec![("pomodoro".to_string(), 1_503_000)]);
        assert!(!ticker.is_active());
    }

    #[tokio::test]
    async fn stop_cancels_ticks() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 12, 12, 0, 0).unwrap());
        let started = epoch_ms(clock.now());
        let recorder = Arc::new(Recorder::default());
        let mut ticker =
            FocusTicker::new(Duration::from_millis(5)).with_now_provider(clock.provider());

        ticker.start("deep-focus", running(started, Some(2_700_000)), recorder.clone());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(ticker.is_active());

        ticker.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let ticks_after_stop = recorder.ticks.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(recorder.ticks.lock().unwrap().len(), ticks_after_stop);
        assert!(ticks_after_stop >= 1);
        assert!(recorder.completions.lock().unwrap().is_empty());
    }
}
