pub mod backup;
pub mod budget;
pub mod dashboard;
pub mod goals;
pub mod mood;
pub mod output;
pub mod projects;
pub mod todo;
pub mod wishlist;

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{builder::FalseyValueParser, ArgAction, Parser, Subcommand, ValueEnum};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    storage::{
        backend::{Backend, BackendKind},
        synced::Synced,
    },
    trackers::TrackerRecord,
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
        time::parse_day,
    },
};

use output::Painter;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum DateStyle {
    #[default]
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "Daybook", version, long_about = None)]
#[command(about = "Personal dashboard of projects, goals, mood, to-dos, wishlist and budget", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        env = "DAYBOOK_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "DAYBOOK_BACKEND",
        default_value_t = BackendKind::Document,
        help = "Storage engine. Document keeps a JSON file per tracker, collection keeps a JSON Lines store per tracker"
    )]
    backend: BackendKind,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        help = "Disable colored output"
    )]
    no_color: bool,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show a summary of every tracker")]
    Dashboard,
    #[command(about = "Projects and their tasks")]
    Projects {
        #[command(subcommand)]
        command: projects::ProjectCommand,
    },
    #[command(about = "Goals with milestones and notes")]
    Goals {
        #[command(subcommand)]
        command: goals::GoalCommand,
    },
    #[command(about = "Daily mood log")]
    Mood {
        #[command(subcommand)]
        command: mood::MoodCommand,
    },
    #[command(about = "To-do list")]
    Todo {
        #[command(subcommand)]
        command: todo::TodoCommand,
    },
    #[command(about = "Wishlist")]
    Wish {
        #[command(subcommand)]
        command: wishlist::WishCommand,
    },
    #[command(about = "Household budget")]
    Budget {
        #[command(subcommand)]
        command: budget::BudgetCommand,
    },
    #[command(about = "Export a tracker, or everything, into a JSON backup")]
    Export {
        #[command(flatten)]
        command: backup::ExportCommand,
    },
    #[command(about = "Replace local data with a JSON backup")]
    Import {
        #[command(flatten)]
        command: backup::ImportCommand,
    },
}

/// Everything a command needs: the selected storage, the clock and presentation settings.
pub struct Session {
    pub storage: Backend,
    pub clock: Box<dyn Clock>,
    pub date_style: DateStyle,
    pub painter: Painter,
}

impl Session {
    pub fn new(storage: Backend, clock: Box<dyn Clock>, date_style: DateStyle, color: bool) -> Self {
        Self {
            storage,
            clock,
            date_style,
            painter: Painter::new(color),
        }
    }

    /// Loads the list of a tracker, bound to the session storage.
    pub async fn open<R: TrackerRecord>(&self) -> Result<Synced<R, &Backend>> {
        Synced::load(&self.storage, R::KIND.key()).await
    }

    /// Parses a user supplied day, defaulting to today.
    pub fn day(&self, input: Option<&str>) -> Result<NaiveDate> {
        let now = self.clock.time().with_timezone(&Local);
        match input {
            None => Ok(now.date_naive()),
            Some(input) => parse_day(input, now, self.date_style.into()),
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir.clone() {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    execute(args, app_dir, Box::new(DefaultClock)).await
}

/// Renders an error and its causes on a single line for stderr.
pub fn error_line(error: &anyhow::Error) -> String {
    let line = format!("error: {error:#}");
    line.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}

/// Runs parsed arguments against the data in `app_dir`.
pub async fn execute(args: Args, app_dir: PathBuf, clock: Box<dyn Clock>) -> Result<()> {
    debug!("Using {} storage in {app_dir:?}", args.backend);
    let storage = Backend::open(args.backend, &app_dir)?;
    let session = Session::new(storage, clock, args.date_style, !args.no_color);

    match args.commands {
        Commands::Dashboard => dashboard::process_dashboard_command(&session).await,
        Commands::Projects { command } => projects::process_project_command(command, &session).await,
        Commands::Goals { command } => goals::process_goal_command(command, &session).await,
        Commands::Mood { command } => mood::process_mood_command(command, &session).await,
        Commands::Todo { command } => todo::process_todo_command(command, &session).await,
        Commands::Wish { command } => wishlist::process_wish_command(command, &session).await,
        Commands::Budget { command } => budget::process_budget_command(command, &session).await,
        Commands::Export { command } => backup::process_export_command(command, &session).await,
        Commands::Import { command } => backup::process_import_command(command, &session).await,
    }
}
