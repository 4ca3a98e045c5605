//! CLI entry point for tab-gallery.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use tab_gallery_app::{AppConfig, GalleryApp};
use tab_gallery_core::{TabRegistry, UiLevel};
use tab_gallery_store_fs::{FsStore, KeyValueStore, MemoryStore};

mod commands;

/// Inspect and change which gallery tabs are shown.
#[derive(Parser, Debug)]
#[command(
    name = "tab-gallery",
    version,
    about = "tab-gallery: level-gated tab visibility backed by persisted settings"
)]
struct Cli {
    /// Config file (defaults to the per-user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding persisted settings (overrides the config file).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep settings in memory only.
    #[arg(long, conflicts_with = "data_dir")]
    ephemeral: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the settings record.
    Show,

    /// List tabs resolved against the current settings.
    Tabs {
        /// Include hidden tabs.
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Select the ui level (1-3).
    SetLevel { level: UiLevel },

    /// Override the level at which a tab becomes visible.
    TabLevel {
        tab: String,
        #[arg(required_unless_present = "clear")]
        level: Option<UiLevel>,
        /// Remove the override instead.
        #[arg(long, conflicts_with = "level")]
        clear: bool,
    },

    /// Store a custom display name for a tab.
    Rename { tab: String, title: String },

    /// Pin an example for quick access.
    Focus { example: String },

    /// Unpin an example.
    Unfocus { example: String },

    /// Replace the free-form overrides blob.
    Overrides { json: String },

    /// List example resources.
    Resources,

    /// Restore default settings.
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli {
        config,
        data_dir,
        ephemeral,
        cmd,
    } = Cli::parse();

    install_tracing();

    let config = AppConfig::load(config.as_deref())?;
    let runtime = tokio::runtime::Runtime::new()?;
    if ephemeral {
        return runtime.block_on(execute_command(MemoryStore::new(), &config, cmd));
    }
    let dir = match data_dir {
        Some(dir) => dir,
        None => config.data_dir()?,
    };
    runtime.block_on(execute_command(FsStore::new(dir), &config, cmd))
}

async fn execute_command<S: KeyValueStore>(store: S, config: &AppConfig, command: Command) -> Result<()> {
    let app = GalleryApp::bootstrap(store, TabRegistry::builtin(), config.default_settings()).await;
    commands::run(command, &app, config).await
}

fn install_tracing() {
    // RUST_LOG is honoured; INFO otherwise. Logs go to stderr so stdout stays parseable.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
