pub mod config;
pub mod errors;
pub mod form;
pub mod gate;
pub mod hotkeys;
pub mod log_retention;
pub mod logging;
pub mod record;
pub mod runtime;
pub mod store;
pub mod tui;
pub mod workbook;

use clap::{error::ErrorKind, Parser, Subcommand};
use config::{load_config, log_path, store_path, CliOverrides};
use errors::PresensiError;
use form::{
    add_command, find_command, list_command, sort_command, FindField, MSG_ADDED, MSG_SORTED,
};
use logging::{EventLog, JsonlLogger};
use record::AttendanceStatus;
use runtime::{ProductionRuntime, Terminal};
use serde_json::json;
use store::{AttendanceStore, LoadOutcome};

#[derive(Debug, Clone, Parser)]
#[command(name = "presensi")]
#[command(about = "Attendance log editor backed by a spreadsheet file")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    #[arg(long)]
    pub working_dir: Option<std::path::PathBuf>,
    /// Backing spreadsheet, overrides store.path from the config.
    #[arg(long)]
    pub file: Option<std::path::PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Append one attendance record.
    Add {
        #[arg(long)]
        name: String,
        /// DD-MM-YYYY
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "Present")]
        status: String,
    },
    /// Show the first record whose name or date (DD-MM-YYYY) matches.
    Find {
        query: String,
        /// Restrict the match to one column.
        #[arg(long, value_enum, default_value_t = FindField::Any)]
        by: FindField,
    },
    /// Show every record in stored order.
    List,
    /// Sort records by date and save.
    Sort,
}

impl Command {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Find { .. } => "find",
            Self::List => "list",
            Self::Sort => "sort",
        }
    }
}

pub fn run() -> Result<i32, PresensiError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| PresensiError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, PresensiError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(PresensiError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        working_dir: cli.working_dir.clone(),
        file: cli.file.clone(),
    };
    let (cfg, scope) = load_config(&overrides, cwd, runtime.file_system.as_ref())?;

    let events = if cfg.logging.enabled {
        let mut logger = JsonlLogger::new(log_path(&cfg, &scope));
        logger.max_payload_bytes = cfg.logging.max_payload_bytes;
        logger.budget_bytes = cfg.logging.budget_bytes;
        EventLog::new(logger)
    } else {
        EventLog::disabled()
    };
    let store_file = store_path(&cfg, &scope);
    let mode = cli.command.as_ref().map(Command::as_str).unwrap_or("form");
    events.info(
        "startup",
        json!({"mode": mode, "store": store_file.display().to_string()}),
    );

    if let Err(error) = cfg.gate.check(runtime.clock.as_ref()) {
        events.warn(
            "gate_denied",
            json!({
                "now": runtime.clock.now().to_string(),
                "start_hour": cfg.gate.start_hour,
                "end_hour": cfg.gate.end_hour,
            }),
        );
        runtime.terminal.write_line(&error.to_string())?;
        return Ok(1);
    }

    if cli.command.is_none() && !runtime.terminal.stdin_is_tty() {
        return Err(PresensiError::Cli(
            "the attendance form needs an interactive terminal; use add, find, list or sort"
                .to_string(),
        ));
    }

    let mut store = AttendanceStore::new(&store_file);
    let load_error = match store.load() {
        Ok(outcome) => {
            let records = match outcome {
                LoadOutcome::Created => 0,
                LoadOutcome::Loaded(count) => count,
            };
            events.info(
                "store_loaded",
                json!({"created": outcome == LoadOutcome::Created, "records": records}),
            );
            None
        }
        Err(error) => {
            events.error("store_load_failed", json!({"error": error.to_string()}));
            Some(error)
        }
    };

    match cli.command {
        None => {
            tui::run_form(
                &mut store,
                runtime.clock.as_ref(),
                &events,
                load_error.map(|error| error.to_string()),
            )?;
            Ok(0)
        }
        Some(command) => {
            // One-shot commands stop here rather than rewrite a file that
            // failed to load.
            if let Some(error) = load_error {
                runtime.terminal.write_line(&error.to_string())?;
                return Ok(1);
            }
            run_command(command, &mut store, &events, runtime.terminal.as_ref())
        }
    }
}

fn run_command(
    command: Command,
    store: &mut AttendanceStore,
    events: &EventLog,
    terminal: &dyn Terminal,
) -> Result<i32, PresensiError> {
    match command {
        Command::Add {
            name,
            date,
            time,
            status,
        } => {
            let status = AttendanceStatus::parse(&status)
                .map(|status| status.as_str().to_string())
                .unwrap_or(status);
            match add_command(store, events, &name, &date, &time, &status) {
                Ok(()) => {
                    terminal.write_line(MSG_ADDED)?;
                    Ok(0)
                }
                Err(message) => {
                    terminal.write_line(&message)?;
                    Ok(1)
                }
            }
        }
        Command::Find { query, by } => match find_command(store, events, &query, by) {
            Ok(text) => {
                terminal.write_line(text.trim_end())?;
                Ok(0)
            }
            Err(message) => {
                terminal.write_line(&message)?;
                Ok(1)
            }
        },
        Command::List => {
            terminal.write_line(list_command(store).trim_end())?;
            Ok(0)
        }
        Command::Sort => match sort_command(store, events) {
            Ok(()) => {
                terminal.write_line(MSG_SORTED)?;
                Ok(0)
            }
            Err(message) => {
                terminal.write_line(&message)?;
                Ok(1)
            }
        },
    }
}
