use std::sync::Arc;

use clap::{Subcommand, ValueEnum};
use timenest_core::storage::{Database, SettingsStore};

use super::{dispatcher, load_config, print_json, scheduler, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[derive(Subcommand)]
pub enum RemindersAction {
    /// Poll for due tasks until Ctrl-C
    Run,
    /// Run a single reminder cycle now
    Check,
    /// Show notification and voice availability
    Status,
    /// Send a test reminder
    Test,
    /// Turn spoken reminders on or off
    Voice { state: Toggle },
    /// Turn desktop notifications on or off
    Notifications { state: Toggle },
}

pub async fn run(action: RemindersAction) -> CliResult {
    let config = load_config()?;

    match action {
        RemindersAction::Run => {
            let scheduler = Arc::new(scheduler(&config)?);
            let mut handle = scheduler
                .spawn()
                .ok_or("no notification or speech backend available")?;
            eprintln!(
                "watching for due tasks every {}s, Ctrl-C to stop",
                config.reminders.poll_interval_secs
            );
            tokio::signal::ctrl_c().await?;
            handle.stop();
        }
        RemindersAction::Check => {
            let fired = scheduler(&config)?.run_cycle().await;
            print_json(&fired)?;
        }
        RemindersAction::Status => {
            print_json(&dispatcher(&config)?.status())?;
        }
        RemindersAction::Test => {
            if scheduler(&config)?.send_test_reminder().await {
                println!("test reminder sent");
            } else {
                return Err("nothing delivered; check `timenest reminders status`".into());
            }
        }
        RemindersAction::Voice { state } => {
            SettingsStore::new(Database::open()?).set_voice_enabled(state.enabled())?;
            println!("voice reminders {}", if state.enabled() { "on" } else { "off" });
        }
        RemindersAction::Notifications { state } => {
            SettingsStore::new(Database::open()?).set_notifications_enabled(state.enabled())?;
            println!("notifications {}", if state.enabled() { "on" } else { "off" });
        }
    }
    Ok(())
}
