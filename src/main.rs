use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Result, eyre};
use std::path::PathBuf;
use taskboard::config::{Config, Overrides};
use taskboard::{FileSlot, Filter, NewTask, Priority, Resolved, Slot, Task, TaskStore, format_date, is_overdue};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "TaskBoard CLI - Personal task list with local persistence")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, env = "TASKBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory the task file lives in
    #[arg(long, env = "TASKBOARD_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, env = "TASKBOARD_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long, default_value_t = Priority::Medium)]
        priority: Priority,

        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// List tasks
    List {
        /// all, active or completed (defaults to the configured filter)
        #[arg(short, long)]
        filter: Option<Filter>,
    },

    /// Mark a task done, or open again
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
    },

    /// Show task counts
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&Overrides {
        config_path: cli.config.clone(),
        data_dir: cli.data_dir.clone(),
        log_level: cli.log_level.clone(),
    })?;

    // Setup tracing
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Held from hydrate through the last write
    let mut slot = FileSlot::open(&config.data_dir, &config.storage_key)?;
    slot.hold_lock()?;
    tracing::debug!(path = ?slot.path(), "Opened task slot");

    let mut store = TaskStore::open(slot);
    run(&mut store, cli.command, &config)
}

fn run<S: Slot>(store: &mut TaskStore<S>, command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Add {
            title,
            description,
            priority,
            due,
        } => {
            let task = store.add(NewTask {
                title,
                description,
                priority,
                due_date: due,
            })?;
            println!("Added {} {}", store.short_id(&task.id).cyan(), task.title);
        }
        Commands::List { filter } => {
            store.set_filter(filter.unwrap_or(config.default_filter));
            let view = store.derive();

            if view.visible.is_empty() {
                println!("No {} tasks", store.filter());
            }
            for task in &view.visible {
                println!("{}", render_task(task, store.short_id(&task.id)));
            }
            println!();
            print_counts(view.total_count, view.active_count, view.completed_count);
        }
        Commands::Toggle { id } => {
            let id = resolve_id(store, &id)?;
            store.toggle(&id);
            if let Some(task) = store.get(&id) {
                let state = if task.completed { "Completed" } else { "Reopened" };
                println!("{} {} {}", state, store.short_id(&task.id).cyan(), task.title);
            }
        }
        Commands::Delete { id } => {
            let id = resolve_id(store, &id)?;
            let label = store
                .get(&id)
                .map(|t| format!("{} {}", store.short_id(&t.id).cyan(), t.title))
                .unwrap_or_default();
            store.delete(&id);
            println!("Deleted {}", label);
        }
        Commands::Stats => {
            let view = store.derive();
            print_counts(view.total_count, view.active_count, view.completed_count);
        }
    }

    Ok(())
}

fn resolve_id<S: Slot>(store: &TaskStore<S>, prefix: &str) -> Result<String> {
    match store.resolve(prefix) {
        Resolved::Unique(id) => Ok(id),
        Resolved::Ambiguous(n) => Err(eyre!("Id prefix {} matches {} tasks, use more characters", prefix, n)),
        Resolved::NotFound => Err(eyre!("No task matches {}", prefix)),
    }
}

fn render_task(task: &Task, short_id: &str) -> String {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };
    let title: ColoredString = if task.completed {
        task.title.dimmed().strikethrough()
    } else {
        task.title.bold()
    };

    let mut line = format!(
        "{} {} {} {}  {}",
        checkbox,
        short_id.cyan(),
        priority_label(task.priority),
        title,
        format_date(task.due_date).dimmed()
    );

    if is_overdue(task.due_date, task.completed) {
        line.push_str(&format!("  {}", "OVERDUE".red().bold()));
    }
    if !task.description.is_empty() {
        line.push_str(&format!("\n      {}", task.description.dimmed()));
    }

    line
}

fn priority_label(priority: Priority) -> ColoredString {
    let label = format!("{:<6}", priority.to_string());
    match priority {
        Priority::High => label.red(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.green(),
    }
}

fn print_counts(total: usize, active: usize, completed: usize) {
    println!(
        "{} total, {} active, {} completed",
        total.to_string().bold(),
        active.to_string().yellow(),
        completed.to_string().green()
    );
}
