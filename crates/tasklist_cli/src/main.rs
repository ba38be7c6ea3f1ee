//! Local CLI over the task list core.
//!
//! # Responsibility
//! - Run the same use-cases as the mobile UI against a local database.
//! - Print either one line per task or JSON for scripting.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version, init_logging, CoreConfig, KvTaskRepository, SqliteKvStore, Task, TaskFilter,
    TaskService, TaskSummary,
};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Manage the local task list")]
struct Cli {
    /// SQLite database file (overrides TASKLIST_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Print JSON instead of plain lines.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// Absolute directory for rolling log files (overrides TASKLIST_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides TASKLIST_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a pending task.
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// List tasks.
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Flip completion state.
    Toggle { id: String },
    /// Mark a task completed.
    Done { id: String },
    /// Mark a task pending.
    Undo { id: String },
    /// Replace a task title.
    Rename {
        id: String,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Delete a task.
    Delete { id: String },
    /// Delete every completed task.
    ClearCompleted,
    /// Print completion counts.
    Summary,
    /// Print the core version.
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Pending,
    Completed,
}

impl From<FilterArg> for TaskFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => TaskFilter::All,
            FilterArg::Pending => TaskFilter::Pending,
            FilterArg::Completed => TaskFilter::Completed,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, &log_dir.to_string_lossy())
            .context("failed to initialize logging")?;
    }

    if let Command::Version = cli.command {
        println!("tasklist_core version={}", core_version());
        return Ok(());
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let service = TaskService::new(KvTaskRepository::new(SqliteKvStore::new(&conn)));
    let out = Output { json: cli.json };

    match cli.command {
        Command::Add { title } => out.task(&service.create_task(&title.join(" "))?),
        Command::List { filter } => out.tasks(&service.list_tasks(filter.into())?),
        Command::Toggle { id } => out.task(&service.toggle_completed(&id)?),
        Command::Done { id } => out.task(&service.set_completed(&id, true)?),
        Command::Undo { id } => out.task(&service.set_completed(&id, false)?),
        Command::Rename { id, title } => out.task(&service.rename_task(&id, &title.join(" "))?),
        Command::Delete { id } => out.tasks(&service.delete_task(&id)?),
        Command::ClearCompleted => out.removed(service.clear_completed()?),
        Command::Summary => out.summary(&service.summary()?),
        // Printed before the database is opened.
        Command::Version => Ok(()),
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn task(&self, task: &Task) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(task)?);
        } else {
            println!("{}", task_line(task));
        }
        Ok(())
    }

    fn tasks(&self, tasks: &[Task]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(tasks)?);
        } else if tasks.is_empty() {
            println!("no tasks");
        } else {
            for task in tasks {
                println!("{}", task_line(task));
            }
        }
        Ok(())
    }

    fn removed(&self, count: usize) -> Result<()> {
        if self.json {
            println!("{}", json!({ "removed": count }));
        } else {
            println!("removed {count} completed task(s)");
        }
        Ok(())
    }

    fn summary(&self, summary: &TaskSummary) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(summary)?);
        } else {
            println!(
                "total={} pending={} completed={}",
                summary.total, summary.pending, summary.completed
            );
        }
        Ok(())
    }
}

fn task_line(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    format!("[{mark}] {} {}", task.id, task.title)
}
