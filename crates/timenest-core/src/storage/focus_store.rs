use tracing::warn;

use super::Database;
use crate::error::Result;
use crate::focus::PersistedFocusState;

pub const FOCUS_STATE_KEY: &str = "timenest_focus_tools_v1";

/// Loads and saves the focus blob as a whole.
pub struct FocusStore {
    db: Database,
}

impl FocusStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Current state. Missing, unreadable, or corrupt data yields the empty shape.
    pub fn load(&self) -> PersistedFocusState {
        let raw = match self.db.kv_get(FOCUS_STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PersistedFocusState::default(),
            Err(e) => {
                warn!("focus state unreadable, starting empty: {e}");
                return PersistedFocusState::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("focus state corrupt, starting empty: {e}");
            PersistedFocusState::default()
        })
    }

    pub fn save(&self, state: &PersistedFocusState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.db.kv_set(FOCUS_STATE_KEY, &json)?;
        Ok(())
    }
}
