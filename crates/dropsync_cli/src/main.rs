//! dropsync CLI
//!
//! Enhance page fixtures, replay scripted interaction, and manage the
//! persisted theme.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dropsync_core::store::Storage;
use dropsync_widgets::theme::STORAGE_KEY;
use dropsync_widgets::Theme;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod page;
mod session;
mod storage;

use config::Fixture;
use session::Session;
use storage::{FileStorage, DEFAULT_STORAGE_FILE};

#[derive(Parser)]
#[command(name = "dropsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Searchable dropdowns over native selects", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Theme storage file
    #[arg(long, global = true, default_value = DEFAULT_STORAGE_FILE)]
    storage: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a page fixture and print the resulting markup
    Render {
        /// Fixture file
        fixture: PathBuf,

        /// Write the markup here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Enhance a page fixture and replay its steps
    Replay {
        /// Fixture file
        fixture: PathBuf,

        /// Write the final markup here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change the persisted theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Print the persisted theme
    Show,
    /// Flip the persisted theme
    Toggle,
    /// Persist a theme
    Set {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Render { fixture, output } => {
            cmd_render(&fixture, &cli.storage, output.as_deref())
        }

        Commands::Replay { fixture, output } => {
            cmd_replay(&fixture, &cli.storage, output.as_deref())
        }

        Commands::Theme { command } => {
            cmd_theme(&cli.storage, command.unwrap_or(ThemeCommands::Show))
        }
    }
}

fn cmd_render(fixture: &Path, storage: &Path, output: Option<&Path>) -> Result<()> {
    let fixture = Fixture::load(fixture)?;
    let storage = FileStorage::open(storage)?;
    let session = Session::start(&fixture, storage)?;
    write_markup(&session.markup(), output)
}

fn cmd_replay(fixture_path: &Path, storage: &Path, output: Option<&Path>) -> Result<()> {
    let fixture = Fixture::load(fixture_path)?;
    let storage = FileStorage::open(storage)?;
    let mut session = Session::start(&fixture, storage)?;

    info!(
        "Replaying {} steps from {}",
        fixture.steps.len(),
        fixture_path.display()
    );
    session.replay(&fixture.steps)?;

    for (name, value) in session.form_data() {
        info!("form: {}={}", name, value);
    }

    if output.is_some() {
        write_markup(&session.markup(), output)?;
    }
    Ok(())
}

fn cmd_theme(storage: &Path, command: ThemeCommands) -> Result<()> {
    let storage = FileStorage::open(storage)?;
    let current = Theme::from_storage_value(storage.get_item(STORAGE_KEY).as_deref());
    let persist = !matches!(command, ThemeCommands::Show);

    let theme = match command {
        ThemeCommands::Show => current,
        ThemeCommands::Toggle => current.toggled(),
        ThemeCommands::Set { theme } => theme.into(),
    };
    if persist {
        storage.set_item(STORAGE_KEY, theme.storage_value());
        info!("Theme saved to {}", storage.path().display());
    }

    println!("{}", if theme.is_dark() { "dark" } else { "light" });
    Ok(())
}

fn write_markup(markup: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, format!("{markup}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Markup written to {}", path.display());
        }
        None => println!("{markup}"),
    }
    Ok(())
}
