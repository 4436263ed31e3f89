pub mod auth;
pub mod config;
pub mod focus;
pub mod reminders;
pub mod run;
pub mod task;

use std::sync::Arc;

use serde::Serialize;
use timenest_core::credentials::KeyringTokenProvider;
use timenest_core::notify::{CommandSpeaker, DesktopNotifier};
use timenest_core::storage::{Database, FocusStore, SettingsStore};
use timenest_core::{
    Config, FocusController, FocusDisplay, FocusEngine, HttpTaskStore, NotificationDispatcher,
    ReminderScheduler, SchedulerConfig, TaskStore,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}

pub fn task_store(config: &Config) -> Result<Arc<dyn TaskStore>, Box<dyn std::error::Error>> {
    let store = HttpTaskStore::from_config(&config.task_store, Arc::new(KeyringTokenProvider))?;
    Ok(Arc::new(store))
}

pub fn focus_controller(
    config: &Config,
    display: Arc<dyn FocusDisplay>,
) -> Result<FocusController, Box<dyn std::error::Error>> {
    let store = FocusStore::new(Database::open()?);
    Ok(FocusController::new(
        store,
        FocusEngine::new(),
        config.focus.tick_interval(),
        display,
    ))
}

pub fn dispatcher(config: &Config) -> Result<Arc<NotificationDispatcher>, Box<dyn std::error::Error>> {
    let settings = SettingsStore::new(Database::open()?).load();
    Ok(Arc::new(NotificationDispatcher::new(
        Arc::new(DesktopNotifier::new(config.notifications.app_name.clone())),
        Arc::new(CommandSpeaker::detect()),
        settings,
    )))
}

pub fn scheduler(config: &Config) -> Result<ReminderScheduler, Box<dyn std::error::Error>> {
    Ok(ReminderScheduler::new(
        task_store(config)?,
        dispatcher(config)?,
        SchedulerConfig::from(&config.reminders),
    ))
}
