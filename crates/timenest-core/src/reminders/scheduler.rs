//! Periodic due-date checks over the task store.
//!
//! Every poll fetches the task list, finds tasks whose due instant is inside
//! a threshold window, and delivers each `(task, threshold)` pair at most once
//! for the lifetime of the scheduler.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::message::{reminder_text, test_text};
use super::threshold::ThresholdKind;
use crate::clock::{system_now, NowProvider};
use crate::events::Event;
use crate::notify::{Notification, NotificationDispatcher};
use crate::storage::RemindersConfig;
use crate::tasks::{Task, TaskStore};

pub type EventSink = Arc<dyn Fn(Event) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    pub initial_delay: Duration,
    /// Tasks further than this from now in either direction are skipped.
    pub lookaround: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&RemindersConfig::default())
    }
}

impl From<&RemindersConfig> for SchedulerConfig {
    fn from(config: &RemindersConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            initial_delay: config.initial_delay(),
            lookaround: Duration::from_secs(config.lookaround_hours * 3600),
        }
    }
}

/// A reminder fired by one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub task_id: String,
    pub task_title: String,
    pub kind: ThresholdKind,
    pub due_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub speech: String,
}

impl Reminder {
    /// Dedup tag, `<taskId>:<kind>`.
    pub fn tag(&self) -> String {
        format!("{}:{}", self.task_id, self.kind)
    }
}

pub struct ReminderScheduler {
    store: Arc<dyn TaskStore>,
    dispatcher: Arc<NotificationDispatcher>,
    config: SchedulerConfig,
    sent: Mutex<HashSet<(String, ThresholdKind)>>,
    now: NowProvider,
    sink: Option<EventSink>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn TaskStore>,
        dispatcher: Arc<NotificationDispatcher>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            config,
            sent: Mutex::new(HashSet::new()),
            now: system_now(),
            sink: None,
        }
    }

    pub fn with_now_provider(mut self, now: NowProvider) -> Self {
        self.now = now;
        self
    }

    /// Receive a [`Event::ReminderSent`] for every delivered reminder.
    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    pub fn was_sent(&self, task_id: &str, kind: ThresholdKind) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(task_id.to_string(), kind))
    }

    /// Returns false if the pair was already marked.
    fn mark_sent(&self, task_id: &str, kind: ThresholdKind) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((task_id.to_string(), kind))
    }

    /// Pick the reminders due at `now`, marking each as sent.
    pub fn evaluate(&self, tasks: &[Task], now: DateTime<Utc>) -> Vec<Reminder> {
        let poll_ms = self.config.poll_interval.as_millis() as i64;
        let lookaround_ms = self.config.lookaround.as_millis() as i64;
        let mut fired = Vec::new();

        for task in tasks.iter().filter(|t| t.is_reminder_eligible()) {
            let Some(due) = task.due_at() else {
                continue;
            };
            let diff_ms = (due - now).num_milliseconds();
            if diff_ms.abs() > lookaround_ms {
                continue;
            }
            for kind in ThresholdKind::ALL {
                if !kind.in_window(diff_ms, poll_ms) || !self.mark_sent(&task.id, kind) {
                    continue;
                }
                let text = reminder_text(task, kind, due, now);
                fired.push(Reminder {
                    task_id: task.id.clone(),
                    task_title: task.display_title().to_string(),
                    kind,
                    due_at: due,
                    title: text.title,
                    body: text.body,
                    speech: text.speech,
                });
            }
        }
        fired
    }

    /// One poll: fetch, evaluate, deliver. Fetch failures yield no reminders.
    pub async fn run_cycle(&self) -> Vec<Reminder> {
        let tasks = match self.store.list().await {
            Ok(tasks) => tasks,
            Err(e) => {
                debug!("reminder cycle skipped: {e}");
                return Vec::new();
            }
        };
        let now = (self.now)();
        let reminders = self.evaluate(&tasks, now);
        for reminder in &reminders {
            self.deliver(reminder, now).await;
        }
        reminders
    }

    async fn deliver(&self, reminder: &Reminder, now: DateTime<Utc>) {
        let notification =
            Notification::new(&reminder.title, &reminder.body).with_tag(reminder.tag());
        self.dispatcher.notify(&notification).await;
        self.dispatcher.speak(&reminder.speech);
        info!(task = %reminder.task_id, kind = %reminder.kind, "reminder sent");

        if let Some(sink) = &self.sink {
            sink(Event::ReminderSent {
                task_id: reminder.task_id.clone(),
                kind: reminder.kind,
                title: reminder.task_title.clone(),
                at: now,
            });
        }
    }

    /// Show a one-off test notification (and speech when voice is on).
    /// Returns whether anything was delivered.
    pub async fn send_test_reminder(&self) -> bool {
        let text = test_text((self.now)());
        let shown = self
            .dispatcher
            .notify(&Notification::new(text.title, text.body))
            .await;
        let spoken = self.dispatcher.speak(&text.speech);
        shown || spoken
    }

    /// Start polling in the background.
    ///
    /// Returns `None` when the host can neither notify nor speak. Each cycle
    /// runs as its own task so a slow fetch never delays the next poll.
    /// Must be called inside a tokio runtime.
    pub fn spawn(self: &Arc<Self>) -> Option<SchedulerHandle> {
        if !self.dispatcher.can_deliver() {
            info!("no notification or speech backend; reminders disabled");
            return None;
        }

        let scheduler = Arc::clone(self);
        let period = self.config.poll_interval;
        let initial_delay = self.config.initial_delay;

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            time::sleep(initial_delay).await;
            spawn_cycle(&scheduler);

            loop {
                interval.tick().await;
                spawn_cycle(&scheduler);
            }
        });

        info!(poll_secs = period.as_secs(), "reminder scheduler started");
        Some(SchedulerHandle { task: Some(task) })
    }
}

fn spawn_cycle(scheduler: &Arc<ReminderScheduler>) {
    let scheduler = Arc::clone(scheduler);
    tokio::spawn(async move {
        scheduler.run_cycle().await;
    });
}

/// Owns the polling loop. Stopping or dropping it cancels future polls;
/// a cycle already in flight runs to completion.
pub struct SchedulerHandle {
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("reminder scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
