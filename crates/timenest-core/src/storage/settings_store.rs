use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Database;
use crate::error::Result;

pub const VOICE_ENABLED_KEY: &str = "timenest_voice_reminders_enabled";
pub const NOTIFICATIONS_ENABLED_KEY: &str = "timenest_notifications_enabled";

/// User toggles for reminder delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub voice_enabled: bool,
    pub notifications_enabled: bool,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            voice_enabled: false,
            notifications_enabled: true,
        }
    }
}

pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn load(&self) -> ReminderSettings {
        let defaults = ReminderSettings::default();
        ReminderSettings {
            voice_enabled: self.flag(VOICE_ENABLED_KEY, defaults.voice_enabled),
            notifications_enabled: self
                .flag(NOTIFICATIONS_ENABLED_KEY, defaults.notifications_enabled),
        }
    }

    pub fn set_voice_enabled(&self, enabled: bool) -> Result<()> {
        self.db.kv_set(VOICE_ENABLED_KEY, bool_str(enabled))?;
        Ok(())
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<()> {
        self.db.kv_set(NOTIFICATIONS_ENABLED_KEY, bool_str(enabled))?;
        Ok(())
    }

    /// A stored value counts as on only when it is exactly `true`.
    fn flag(&self, key: &str, default: bool) -> bool {
        match self.db.kv_get(key) {
            Ok(Some(raw)) => raw.trim() == "true",
            Ok(None) => default,
            Err(e) => {
                debug!(key, "flag unreadable, using default: {e}");
                default
            }
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
