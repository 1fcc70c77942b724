//! # dailydo
//!
//! A terminal daily task and habit tracker. Pick from recommended habits or
//! add your own tasks, organise them by day on a week strip, check them off,
//! and keep notes and checklists with each one.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! dailydo
//! # or explicitly
//! dailydo ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `←`/`→` (`h`/`l`): Previous / next day
//! *   `[`/`]`: Previous / next week
//! *   `t`: Jump to today
//! *   `a`: Add a task to the selected day
//! *   `Space`: Toggle done
//! *   `e`: Edit details
//! *   `c`: Add checklist item
//! *   `d`: Delete selected task
//! *   `v`: Switch between the day view and analytics
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # Add a task for today, or for a given day
//! dailydo add "Buy milk"
//! dailydo add "Dentist" --day 2025-03-14
//!
//! # Show a day
//! dailydo list --day 2025-03-14
//!
//! # Onboarding: add recommended habits 1, 3 and 6 to today
//! dailydo habits list
//! dailydo habits pick 1 3 6
//!
//! # Check off, annotate, and build a checklist
//! dailydo toggle <ID>
//! dailydo details <ID> --text "Skimmed and whole"
//! dailydo checklist add <ID> "Check expiry"
//!
//! # Data management
//! dailydo export backup.json
//! dailydo import backup.json --replace
//! dailydo clear
//! ```
//!
//! ## Data Storage
//!
//! Data is saved in your local data directory:
//! *   Linux: `~/.local/share/dailydo/`
//! *   macOS: `~/Library/Application Support/dailydo/`
//! *   Windows: `%APPDATA%\dailydo\`
//!
//! Override it with `DAILYDO_DATA_DIR` or `data_dir` in
//! `~/.config/dailydo/config.toml`. Set `DAILYDO_LOG` (e.g. `debug`) to see logs.
//! Commands log to stderr; the TUI appends to `dailydo.log` in the data directory.

use std::io;
use std::path::PathBuf;
use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use dailydo::board::ImportPolicy;
use dailydo::commands::*;
use dailydo::config::Config;
use dailydo::logging::LogTarget;
use dailydo::models::ReminderKind;
use dailydo::storage::FileStore;
use dailydo::tui::run_tui;

#[derive(Parser)]
#[command(name = "dailydo")]
#[command(about = "Daily tasks and habits in your terminal", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task to a day
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Day in YYYY-MM-DD (default: today)
        #[arg(short, long)]
        day: Option<String>,
    },
    /// List the tasks of a day
    List {
        /// Day in YYYY-MM-DD (default: today)
        #[arg(short, long)]
        day: Option<String>,
        /// List every task instead of one day
        #[arg(short, long)]
        all: bool,
    },
    /// Toggle a task between pending and done
    Toggle {
        id: String,
    },
    /// Remove a task
    Remove {
        id: String,
    },
    /// Show everything about a task
    Show {
        id: String,
    },
    /// Edit a task's notes or image reference
    Details {
        id: String,
        /// New notes text (empty string clears it)
        #[arg(short, long)]
        text: Option<String>,
        /// Path or URI of an image to attach
        #[arg(short, long, conflicts_with = "clear_image")]
        image: Option<String>,
        /// Remove the attached image reference
        #[arg(long)]
        clear_image: bool,
    },
    /// Manage a task's checklist
    Checklist {
        #[command(subcommand)]
        command: ChecklistCommands,
    },
    /// Recommended habits
    Habits {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Show completion statistics
    Stats,
    /// Export all tasks to a JSON file
    Export {
        path: PathBuf,
    },
    /// Import tasks from an exported JSON file
    Import {
        path: PathBuf,
        /// Replace existing tasks that have the same id
        #[arg(long, conflicts_with = "skip")]
        replace: bool,
        /// Keep existing tasks that have the same id
        #[arg(long)]
        skip: bool,
    },
    /// Delete all tasks
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Daily reminder settings
    Reminders {
        #[command(subcommand)]
        command: Option<ReminderCommands>,
    },
    /// Show or set your display name
    Name {
        /// New name (empty string clears it)
        name: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum ChecklistCommands {
    /// Append a checklist item
    Add {
        id: String,
        text: String,
    },
    /// Toggle the item at a position (starting at 1)
    Toggle {
        id: String,
        position: usize,
    },
    /// Remove the item at a position (starting at 1)
    Remove {
        id: String,
        position: usize,
    },
}

#[derive(Subcommand)]
enum HabitCommands {
    /// List recommended habits
    List,
    /// Add your own habit to the recommendations
    Add {
        title: String,
    },
    /// Add recommended habits, by number, to a day
    Pick {
        #[arg(required = true)]
        numbers: Vec<usize>,
        /// Day in YYYY-MM-DD (default: today)
        #[arg(short, long)]
        day: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReminderCommands {
    /// Show reminder settings
    Show,
    /// Turn a reminder on or off
    Toggle {
        #[arg(value_enum)]
        kind: ReminderKind,
    },
    /// Set the time of a reminder
    Time {
        #[arg(value_enum)]
        kind: ReminderKind,
        /// Time of day in HH:MM
        time: String,
    },
}

fn init_tracing(level: &str, verbose: bool, target: &LogTarget) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { level };
    let filter = tracing_subscriber::EnvFilter::try_from_env("DAILYDO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(target.make_writer())
        .with_ansi(target.ansi())
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load configuration")?;
    let data_dir = config.data_dir();
    let target = match cli.command {
        Some(Commands::Ui) | None => LogTarget::for_tui(&data_dir),
        _ => LogTarget::Stderr,
    };
    init_tracing(&config.log_level, cli.verbose, &target)?;

    let store = FileStore::new(data_dir);
    tracing::debug!(data_dir = %store.root().display(), "using data directory");
    let kv = &store;

    match cli.command {
        Some(Commands::Add { title, day }) => cmd_add(kv, title, day, false),
        Some(Commands::List { day, all }) => cmd_list(kv, day, all),
        Some(Commands::Toggle { id }) => cmd_toggle(kv, id, false),
        Some(Commands::Remove { id }) => cmd_remove(kv, id, false),
        Some(Commands::Show { id }) => cmd_show(kv, id),
        Some(Commands::Details { id, text, image, clear_image }) => cmd_details(kv, id, text, image, clear_image, false),
        Some(Commands::Checklist { command }) => match command {
            ChecklistCommands::Add { id, text } => cmd_checklist_add(kv, id, text, false),
            ChecklistCommands::Toggle { id, position } => cmd_checklist_toggle(kv, id, position, false),
            ChecklistCommands::Remove { id, position } => cmd_checklist_remove(kv, id, position, false),
        },
        Some(Commands::Habits { command }) => match command {
            HabitCommands::List => cmd_habits_list(kv),
            HabitCommands::Add { title } => cmd_habits_add(kv, title, false),
            HabitCommands::Pick { numbers, day } => cmd_habits_pick(kv, numbers, day, false),
        },
        Some(Commands::Stats) => cmd_stats(kv),
        Some(Commands::Export { path }) => cmd_export(kv, &path, false),
        Some(Commands::Import { path, replace, skip }) => {
            let policy = if replace {
                ImportPolicy::Replace
            } else if skip {
                ImportPolicy::Skip
            } else {
                config.import_policy
            };
            cmd_import(kv, &path, policy, false)
        }
        Some(Commands::Clear { force }) => cmd_clear(kv, force),
        Some(Commands::Reminders { command }) => match command {
            Some(ReminderCommands::Show) | None => cmd_reminders_show(kv),
            Some(ReminderCommands::Toggle { kind }) => cmd_reminders_toggle(kv, kind, false),
            Some(ReminderCommands::Time { kind, time }) => cmd_reminders_time(kv, kind, time, false),
        },
        Some(Commands::Name { name }) => cmd_name(kv, name, false),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "dailydo", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(kv) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
    Ok(())
}
