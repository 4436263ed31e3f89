use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::debug;

use super::{Notification, NotificationService, Permission, SpeechService};
use crate::storage::ReminderSettings;

/// Snapshot of what the dispatcher can deliver right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryStatus {
    pub notifications_supported: bool,
    /// `None` when notifications are unsupported.
    pub permission: Option<Permission>,
    pub voice_supported: bool,
    pub voice_enabled: bool,
    pub notifications_enabled: bool,
}

/// Routes reminders to the notification and speech services, honoring the
/// user's toggles. Delivery failures are logged and dropped.
pub struct NotificationDispatcher {
    notifier: Arc<dyn NotificationService>,
    speaker: Arc<dyn SpeechService>,
    settings: RwLock<ReminderSettings>,
    permission_requested: AtomicBool,
}

impl NotificationDispatcher {
    pub fn new(
        notifier: Arc<dyn NotificationService>,
        speaker: Arc<dyn SpeechService>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            notifier,
            speaker,
            settings: RwLock::new(settings),
            permission_requested: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> ReminderSettings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_settings(&self, settings: ReminderSettings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Whether either channel exists on this host, regardless of toggles.
    pub fn can_deliver(&self) -> bool {
        self.notifier.is_supported() || self.speaker.is_available()
    }

    pub fn status(&self) -> DeliveryStatus {
        let settings = self.settings();
        let supported = self.notifier.is_supported();
        DeliveryStatus {
            notifications_supported: supported,
            permission: supported.then(|| self.notifier.permission()),
            voice_supported: self.speaker.is_available(),
            voice_enabled: settings.voice_enabled,
            notifications_enabled: settings.notifications_enabled,
        }
    }

    /// Ask for permission once per dispatcher, and only while undecided.
    async fn ensure_permission(&self) -> Permission {
        let current = self.notifier.permission();
        if current != Permission::Default {
            return current;
        }
        if self.permission_requested.swap(true, Ordering::SeqCst) {
            return current;
        }
        match self.notifier.request_permission().await {
            Ok(permission) => permission,
            Err(e) => {
                debug!("permission request failed: {e}");
                self.notifier.permission()
            }
        }
    }

    /// Show `notification` if allowed. Returns whether it was handed to the host.
    pub async fn notify(&self, notification: &Notification) -> bool {
        if !self.notifier.is_supported() || !self.settings().notifications_enabled {
            return false;
        }
        if self.ensure_permission().await != Permission::Granted {
            return false;
        }
        match self.notifier.show(notification).await {
            Ok(()) => true,
            Err(e) => {
                debug!(tag = ?notification.tag, "notification not shown: {e}");
                false
            }
        }
    }

    /// Speak `text` if voice reminders are on. Returns whether it was queued.
    pub fn speak(&self, text: &str) -> bool {
        if !self.settings().voice_enabled || !self.speaker.is_available() {
            return false;
        }
        match self.speaker.speak(text) {
            Ok(()) => true,
            Err(e) => {
                debug!("speech failed: {e}");
                false
            }
        }
    }
}
