//! Memory Lane CLI
//!
//! Command-line interface for Memory Lane - a timeline of notes captured
//! where you are.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lane_core::{CaptureMode, Config, MemoryLane, StorageError};

mod commands;
mod editor;
mod output;
mod shell;

use commands::note::{AddArgs, EditArgs};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "lane")]
#[command(about = "Memory Lane - capture notes where you are")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a new note (opens $EDITOR if no text is given)
    #[command(alias = "new")]
    Add {
        /// Note text
        content: Option<String>,
        /// Note title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Tags to add
        #[arg(short, long)]
        tag: Vec<String>,
        /// Mark as favorite
        #[arg(short, long)]
        favorite: bool,
        /// Capture mode (quick, detailed, voice)
        #[arg(short, long)]
        mode: Option<CaptureMode>,
    },
    /// Show the timeline, newest first
    #[command(alias = "ls")]
    List {
        /// Only notes with this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
    },
    /// Show a note in full
    Show {
        /// Note ID (full ID or prefix)
        id: String,
    },
    /// Edit a note (opens $EDITOR if no fields are given)
    Edit {
        /// Note ID (full ID or prefix)
        id: String,
        /// New title
        #[arg(short = 'T', long, conflicts_with = "clear_title")]
        title: Option<String>,
        /// Remove the title
        #[arg(long)]
        clear_title: bool,
        /// New content
        #[arg(short, long)]
        content: Option<String>,
        /// Replace tags (repeatable)
        #[arg(short, long)]
        tag: Option<Vec<String>>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full ID or prefix)
        id: String,
    },
    /// Toggle a note's favorite flag
    #[command(alias = "fav")]
    Favorite {
        /// Note ID (full ID or prefix)
        id: String,
    },
    /// List all tags
    Tags,
    /// Show or set preferences
    Prefs {
        #[command(subcommand)]
        command: Option<PrefsCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Add the sample timeline
    Seed,
    /// Interactive session with live undo
    Shell,
}

#[derive(Subcommand, Clone)]
enum PrefsCommands {
    /// Show current preferences
    Show,
    /// Set a preference
    Set {
        /// Preference name (theme, font_size, default_capture_mode, ...)
        key: String,
        /// New value
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backend, undo_window_secs, log_file, location)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let mut lane = match MemoryLane::open(&config) {
        Ok(lane) => lane,
        Err(e) => {
            let hint = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<StorageError>())
                .and_then(StorageError::recovery_suggestion);
            if let Some(hint) = hint {
                eprintln!("Hint: {}", hint);
            }
            return Err(e.context("Failed to open Memory Lane data"));
        }
    };

    let result = match cli.command {
        Commands::Add {
            content,
            title,
            tag,
            favorite,
            mode,
        } => {
            let args = AddArgs {
                content,
                title,
                tags: tag,
                favorite,
                mode,
            };
            commands::note::add(&mut lane, args, &output)
        }
        Commands::List { tag, favorites } => {
            commands::note::list(&lane, tag, favorites, &output)
        }
        Commands::Show { id } => commands::note::show(&lane, id, &output),
        Commands::Edit {
            id,
            title,
            clear_title,
            content,
            tag,
        } => {
            let args = EditArgs {
                title,
                clear_title,
                content,
                tags: tag,
            };
            commands::note::edit(&mut lane, id, args, &output)
        }
        Commands::Delete { id } => commands::note::delete(&mut lane, id, &output),
        Commands::Favorite { id } => commands::note::favorite(&mut lane, id, &output),
        Commands::Tags => commands::note::tags(&lane, &output),
        Commands::Prefs { command } => match command {
            Some(PrefsCommands::Show) | None => commands::prefs::show(&lane, &output),
            Some(PrefsCommands::Set { key, value }) => {
                commands::prefs::set(&mut lane, key, value, &output)
            }
        },
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Seed => commands::note::seed(&mut lane, &output),
        Commands::Shell => shell::run(&mut lane, &output).await,
    };

    // One-shot commands exit here, so a pending delete is final
    lane.commit_pending();
    lane.flush().await;

    if lane.failed_writes() > 0 && !output.is_quiet() {
        eprintln!(
            "⚠ {} change(s) could not be saved. Check the log for details.",
            lane.failed_writes()
        );
    }

    result
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Level comes from LANE_LOG (default: warn). Logs go to the configured
/// log file, or stderr when none is set.
fn init_logging(config: &Config) {
    let log_level = std::env::var("LANE_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::new(format!("lane_core={},lane_cli={}", log_level, log_level));

    let Some(log_path) = &config.log_file else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
