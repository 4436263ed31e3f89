//! Desktop notification and speech delivery.

mod desktop;
mod dispatch;

pub use desktop::{CommandSpeaker, DesktopNotifier};
pub use dispatch::{DeliveryStatus, NotificationDispatcher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Notification permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Replacement key: a newer notification with the same tag supersedes the older one.
    pub tag: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    fn is_supported(&self) -> bool;

    fn permission(&self) -> Permission;

    async fn request_permission(&self) -> Result<Permission, NotifyError>;

    async fn show(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Text-to-speech. `speak` returns once the utterance is queued.
pub trait SpeechService: Send + Sync {
    fn is_available(&self) -> bool;

    fn speak(&self, text: &str) -> Result<(), NotifyError>;
}
