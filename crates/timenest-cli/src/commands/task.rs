//! Task commands, backed by the remote task store.

use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use timenest_core::clock::local_date;
use timenest_core::tasks::{daily_tasks, is_overdue, NewTask, Priority, TaskUpdate};
use timenest_core::{Task, TaskStats};

use super::{load_config, print_json, task_store, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks
    List {
        /// Only tasks due today or undated, open first then by priority
        #[arg(long)]
        today: bool,
    },
    /// Completion counters
    Stats,
    /// Create a new task
    Create {
        /// Task title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// high, medium or low
        #[arg(long)]
        priority: Option<Priority>,
        /// YYYY-MM-DD
        #[arg(long)]
        due_date: Option<String>,
        /// HH:MM
        #[arg(long)]
        due_time: Option<String>,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "clear_due")]
        due_date: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due_time: Option<String>,
        /// Remove the due date and time
        #[arg(long)]
        clear_due: bool,
    },
    /// Mark a task completed
    Complete { id: String },
    /// Mark a task not completed
    Reopen { id: String },
    /// Delete a task
    Delete { id: String },
}

#[derive(Serialize)]
struct TaskRow<'a> {
    #[serde(flatten)]
    task: &'a Task,
    overdue: bool,
}

pub async fn run(action: TaskAction) -> CliResult {
    let config = load_config()?;
    let store = task_store(&config)?;

    match action {
        TaskAction::List { today } => {
            let tasks = store.list().await?;
            let now = Utc::now();
            let selected: Vec<&Task> = if today {
                daily_tasks(&tasks, local_date(now))
            } else {
                tasks.iter().collect()
            };
            let rows: Vec<TaskRow> = selected
                .into_iter()
                .map(|task| TaskRow {
                    task,
                    overdue: is_overdue(task, now),
                })
                .collect();
            print_json(&rows)?;
        }
        TaskAction::Stats => {
            let stats = match store.list().await {
                Ok(tasks) => TaskStats::from_tasks(&tasks),
                Err(e) => {
                    tracing::warn!("could not load tasks: {e}");
                    TaskStats::default()
                }
            };
            print_json(&stats)?;
        }
        TaskAction::Create {
            title,
            description,
            priority,
            due_date,
            due_time,
        } => {
            let task = NewTask {
                title,
                description,
                priority,
                due_date,
                due_time,
            };
            print_json(&store.create(&task).await?)?;
        }
        TaskAction::Update {
            id,
            title,
            description,
            priority,
            due_date,
            due_time,
            clear_due,
        } => {
            let mut update = TaskUpdate {
                title,
                description,
                priority,
                completed: None,
                due_date: due_date.map(Some),
                due_time: due_time.map(Some),
            };
            if clear_due {
                update.due_date = Some(None);
                update.due_time = Some(None);
            }
            print_json(&store.update(&id, &update).await?)?;
        }
        TaskAction::Complete { id } => {
            print_json(&store.update(&id, &TaskUpdate::completed(true)).await?)?;
        }
        TaskAction::Reopen { id } => {
            print_json(&store.update(&id, &TaskUpdate::completed(false)).await?)?;
        }
        TaskAction::Delete { id } => {
            store.delete(&id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}
