use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use timenest_core::focus::{NullDisplay, TimerDisplay};
use timenest_core::{Config, Event, FocusAction, FocusDisplay, FocusTool, FOCUS_TOOLS};

use super::{focus_controller, load_config, print_json, CliResult};

#[derive(Subcommand)]
pub enum FocusCommand {
    /// List the focus tools
    Tools,
    /// Start a session (pauses any other running tool)
    Start {
        /// Tool id, e.g. "pomodoro"
        tool: String,
        /// Countdown length; defaults to the tool's duration
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Pause a running session
    Pause { tool: String },
    /// Resume a paused session
    Resume { tool: String },
    /// Stop a session and bank its minutes
    Stop { tool: String },
    /// Print today's focus summary as JSON
    Status,
    /// Follow the running session until it completes or Ctrl-C
    Watch,
}

pub async fn run(action: FocusCommand) -> CliResult {
    let (action, tool) = match action {
        FocusCommand::Tools => return print_json(&FOCUS_TOOLS),
        FocusCommand::Status => {
            let controller = focus_controller(&load_config()?, Arc::new(NullDisplay))?;
            return print_json(&controller.summary());
        }
        FocusCommand::Watch => return watch(&load_config()?).await,
        FocusCommand::Start {
            tool,
            minutes: Some(0),
        } => return Err(format!("--minutes must be positive for {tool}").into()),
        FocusCommand::Start {
            tool,
            minutes: Some(minutes),
        } => (FocusAction::StartFor(minutes.saturating_mul(60_000)), tool),
        FocusCommand::Start { tool, minutes: None } => (FocusAction::Start, tool),
        FocusCommand::Pause { tool } => (FocusAction::Pause, tool),
        FocusCommand::Resume { tool } => (FocusAction::Resume, tool),
        FocusCommand::Stop { tool } => (FocusAction::Stop, tool),
    };

    let controller = focus_controller(&load_config()?, Arc::new(NullDisplay))?;
    let event = controller.apply(action, &tool)?;
    // A one-shot command has nothing to tick for.
    controller.stop_ticker();

    match event {
        Some(event) => print_json(&event),
        None => print_json(&controller.summary()),
    }
}

/// Renders ticks on one terminal line.
struct TerminalDisplay;

impl FocusDisplay for TerminalDisplay {
    fn on_tick(&self, tool: &FocusTool, display: &TimerDisplay) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r{} {}", tool.name, display.clock_label());
        let _ = stdout.flush();
    }

    fn on_event(&self, event: &Event) {
        if let Event::FocusCompleted { tool_id, minutes, .. } = event {
            println!("\n{tool_id} complete: {minutes} min banked");
        }
    }
}

async fn watch(config: &Config) -> CliResult {
    let controller = focus_controller(config, Arc::new(TerminalDisplay))?;
    controller.sync_ticker()?;
    if !controller.is_ticking() {
        println!("no focus session running");
        return Ok(());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                break;
            }
            _ = poll.tick() => {
                if !controller.is_ticking() {
                    break;
                }
            }
        }
    }
    controller.stop_ticker();
    Ok(())
}
