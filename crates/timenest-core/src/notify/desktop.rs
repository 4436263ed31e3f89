use std::path::PathBuf;
use std::process::{Command, Stdio};

use async_trait::async_trait;
use tracing::debug;

use super::{Notification, NotificationService, Permission, SpeechService};
use crate::error::NotifyError;

/// Native desktop notifications via notify-rust.
///
/// Native notification daemons have no permission prompt, so a supported
/// host always reports [`Permission::Granted`].
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl NotificationService for DesktopNotifier {
    fn is_supported(&self) -> bool {
        cfg!(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "macos",
            target_os = "windows"
        ))
    }

    fn permission(&self) -> Permission {
        if self.is_supported() {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    async fn request_permission(&self) -> Result<Permission, NotifyError> {
        Ok(self.permission())
    }

    async fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.is_supported() {
            return Err(NotifyError::Unsupported);
        }
        let app_name = self.app_name.clone();
        let title = notification.title.clone();
        let body = notification.body.clone();
        let tag = notification.tag.clone();

        // The D-Bus / platform call blocks.
        tokio::task::spawn_blocking(move || {
            let mut toast = notify_rust::Notification::new();
            toast.appname(&app_name).summary(&title).body(&body);
            // XDG servers replace an on-screen notification that reuses an id.
            #[cfg(all(unix, not(target_os = "macos")))]
            if let Some(tag) = &tag {
                toast.id(replace_id(tag));
            }
            #[cfg(not(all(unix, not(target_os = "macos"))))]
            let _ = tag;
            toast
                .show()
                .map(|_| ())
                .map_err(|e| NotifyError::Backend(e.to_string()))
        })
        .await
        .map_err(|e| NotifyError::Backend(e.to_string()))?
    }
}

/// Stable non-zero notification id for a tag (32-bit FNV-1a).
///
/// Zero asks the server for a fresh id, so it is never returned.
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
pub(crate) fn replace_id(tag: &str) -> u32 {
    let hash = tag.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    });
    hash.max(1)
}

/// Speech through the first TTS command found on `PATH`.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: Option<PathBuf>,
}

const SPEECH_COMMANDS: [&str; 4] = ["say", "spd-say", "espeak-ng", "espeak"];

impl CommandSpeaker {
    pub fn detect() -> Self {
        let program = std::env::var_os("PATH").and_then(|path| {
            let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
            SPEECH_COMMANDS
                .iter()
                .find_map(|cmd| find_in(&dirs, cmd))
        });
        if let Some(program) = &program {
            debug!(program = %program.display(), "speech command found");
        }
        Self { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self { program: None }
    }
}

fn find_in(dirs: &[PathBuf], cmd: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}

impl SpeechService for CommandSpeaker {
    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn speak(&self, text: &str) -> Result<(), NotifyError> {
        let program = self.program.as_ref().ok_or(NotifyError::Unsupported)?;
        let mut child = Command::new(program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| NotifyError::Backend(e.to_string()))?;
        // Reap in the background so long-running mode leaves no zombies.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_speaker_refuses() {
        let speaker = CommandSpeaker::unavailable();
        assert!(!speaker.is_available());
        assert!(matches!(speaker.speak("hi"), Err(NotifyError::Unsupported)));
    }

    #[test]
    fn finds_command_in_search_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("espeak"), b"").unwrap();
        let dirs = vec![dir.path().to_path_buf()];
        assert_eq!(find_in(&dirs, "espeak"), Some(dir.path().join("espeak")));
        assert_eq!(find_in(&dirs, "say"), None);
    }

    #[test]
    fn replace_id_is_stable_per_tag() {
        assert_eq!(replace_id("a"), 0xe40c_292c);
        assert_eq!(replace_id("t1:due-15"), replace_id("t1:due-15"));
        assert_ne!(replace_id("t1:due-15"), replace_id("t1:due-5"));
        assert_ne!(replace_id(""), 0);
    }
}
