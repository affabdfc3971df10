use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use flotilla_core::config::{LogFormat, LoggingConfig};
use flotilla_core::FlotillaConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "flotilla",
    about = "Flotilla: multi-cluster progressive delivery",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to flotilla.toml (default: ./flotilla.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the strategy once and print the resulting patches
    Evaluate {
        /// Catalog snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Application whose rollout to evaluate
        #[arg(short, long)]
        app: String,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Drive a rollout to completion against simulated clusters.
    ///
    /// Each cycle evaluates the strategy, applies the patches, and lets
    /// every cluster report exactly what its spec asks for.
    Simulate {
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(short, long)]
        app: String,
        /// Override [simulate].max_cycles
        #[arg(long)]
        max_cycles: Option<u32>,
        /// Never advance targetStep on the operator's behalf
        #[arg(long)]
        no_promote: bool,
        /// Write the final catalog here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the contender's strategy steps
    Strategy {
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(short, long)]
        app: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FlotillaConfig> {
    match path {
        Some(path) => Ok(FlotillaConfig::from_file(path)?),
        None => {
            let default = Path::new("flotilla.toml");
            if default.exists() {
                Ok(FlotillaConfig::from_file(default)?)
            } else {
                Ok(FlotillaConfig::default())
            }
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Evaluate {
            snapshot,
            app,
            format,
        } => commands::evaluate::evaluate(&snapshot, &app, format),
        Commands::Simulate {
            snapshot,
            app,
            max_cycles,
            no_promote,
            output,
        } => {
            if let Some(max_cycles) = max_cycles {
                config.simulate.max_cycles = max_cycles;
            }
            if no_promote {
                config.simulate.auto_promote = false;
            }
            commands::simulate::simulate(&snapshot, &app, &config.simulate, output.as_deref())
        }
        Commands::Strategy { snapshot, app } => commands::strategy::show(&snapshot, &app),
    }
}
