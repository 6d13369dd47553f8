//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use dotodo_core::timing;
use dotodo_core::{
    format_elapsed, Config, Event, NewTask, SortMode, Task, TaskPatch, TaskStatus, WarningPatch,
};
use serde::Serialize;

use super::{open_board, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Alert after this many minutes of running time
        #[arg(long, value_name = "MINUTES")]
        warn: Option<f64>,
    },
    /// List tasks, active first
    List {
        /// Case-insensitive match on title or notes
        #[arg(long, short)]
        query: Option<String>,
        /// created-asc, created-desc, title or elapsed
        #[arg(long)]
        sort: Option<SortMode>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one task as JSON
    Show {
        /// Task ID or unique prefix
        id: String,
    },
    /// Start the timer
    Start {
        /// Task ID or unique prefix
        id: String,
    },
    /// Stop the timer
    Stop {
        /// Task ID or unique prefix
        id: String,
    },
    /// Mark complete, stopping the timer
    Done {
        /// Task ID or unique prefix
        id: String,
    },
    /// Reopen a completed task
    Undo {
        /// Task ID or unique prefix
        id: String,
    },
    /// Edit title, notes or warning threshold
    Edit {
        /// Task ID or unique prefix
        id: String,
        /// New title (blank keeps the current one)
        #[arg(long)]
        title: Option<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// New warning threshold in minutes
        #[arg(long, value_name = "MINUTES", conflicts_with = "clear_warn")]
        warn: Option<f64>,
        /// Remove the warning threshold
        #[arg(long)]
        clear_warn: bool,
    },
    /// Delete a task
    Delete {
        /// Task ID or unique prefix
        id: String,
    },
    /// Delete every completed task
    Clear,
}

/// A task plus the values derived from it at display time.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskRow<'a> {
    #[serde(flatten)]
    task: &'a Task,
    status: TaskStatus,
    effective_elapsed_ms: u64,
}

pub fn run(action: TaskAction) -> CliResult {
    let mut board = open_board()?;

    match action {
        TaskAction::Add { title, notes, warn } => {
            let event = board.add(NewTask {
                title,
                notes: notes.unwrap_or_default(),
                warning_minutes: warn,
            })?;
            print_event(&event)?;
        }
        TaskAction::List { query, sort, json } => {
            let mode = match sort {
                Some(mode) => mode,
                None => Config::load_or_default().view.default_sort,
            };
            let view = board.view(query.as_deref().unwrap_or(""), mode);
            let now = view.now;

            if json {
                let active: Vec<_> = view.active.iter().map(|t| row(t, now)).collect();
                let completed: Vec<_> = view.completed.iter().map(|t| row(t, now)).collect();
                let out = serde_json::json!({
                    "active": active,
                    "completed": completed,
                    "stats": view.stats,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Active ({})", view.active.len());
                for t in &view.active {
                    println!("{}", line(&row(t, now)));
                }
                println!("Completed ({})", view.completed.len());
                for t in &view.completed {
                    println!("{}", line(&row(t, now)));
                }
            }
        }
        TaskAction::Show { id } => {
            let task = board.resolve(&id)?;
            println!("{}", serde_json::to_string_pretty(&row(task, board.now()))?);
        }
        TaskAction::Start { id } => {
            let id = board.resolve(&id)?.id.clone();
            let event = board.start(&id)?;
            print_event(&event)?;
        }
        TaskAction::Stop { id } => {
            let id = board.resolve(&id)?.id.clone();
            print_outcome(board.stop(&id)?, "timer is not running")?;
        }
        TaskAction::Done { id } => {
            let id = board.resolve(&id)?.id.clone();
            print_outcome(board.complete(&id)?, "task is already completed")?;
        }
        TaskAction::Undo { id } => {
            let id = board.resolve(&id)?.id.clone();
            print_outcome(board.uncomplete(&id)?, "task is not completed")?;
        }
        TaskAction::Edit {
            id,
            title,
            notes,
            warn,
            clear_warn,
        } => {
            let id = board.resolve(&id)?.id.clone();
            let warning_minutes = match (warn, clear_warn) {
                (Some(minutes), _) => WarningPatch::Set(minutes),
                (None, true) => WarningPatch::Clear,
                (None, false) => WarningPatch::Keep,
            };
            let event = board.edit(
                &id,
                TaskPatch {
                    title,
                    notes,
                    warning_minutes,
                },
            )?;
            print_event(&event)?;
        }
        TaskAction::Delete { id } => {
            let id = board.resolve(&id)?.id.clone();
            let event = board.delete(&id)?;
            print_event(&event)?;
        }
        TaskAction::Clear => {
            let event = board.clear_completed();
            print_event(&event)?;
        }
    }

    if let Some(e) = board.last_store_error() {
        eprintln!("warning: changes were not saved: {e}");
    }
    Ok(())
}

fn row(task: &Task, now: DateTime<Utc>) -> TaskRow<'_> {
    TaskRow {
        task,
        status: task.status(),
        effective_elapsed_ms: timing::effective_elapsed(task, now),
    }
}

fn print_event(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

fn print_outcome(event: Option<Event>, noop: &str) -> CliResult {
    match event {
        Some(event) => print_event(&event),
        None => {
            eprintln!("nothing to do: {noop}");
            Ok(())
        }
    }
}

fn line(row: &TaskRow<'_>) -> String {
    let marker = match row.status {
        TaskStatus::Running => '>',
        TaskStatus::Done => 'x',
        TaskStatus::Pending => ' ',
    };
    let short_id: String = row.task.id.chars().take(8).collect();
    let mut out = format!(
        "  {marker} {short_id:<8}  {}  {}",
        format_elapsed(row.effective_elapsed_ms),
        row.task.title
    );
    if let Some(minutes) = row.task.warning_minutes {
        out.push_str(&format!("  [warn {minutes}m]"));
    }
    out
}
