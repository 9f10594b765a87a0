use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use console_session::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "console-session")]
#[command(about = "Interactive console sessions backed by a worker task")]
#[command(version)]
struct Cli {
    /// Working directory for config lookup (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Path to the config file (defaults to .console-session/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the greeter program in a console session on this terminal
    Run {
        /// Milliseconds between progress updates
        #[arg(long, default_value_t = 200)]
        tick_ms: u64,

        /// Progress updates before each greeting
        #[arg(long, default_value_t = 5)]
        steps: u32,

        /// Write the final transcript and scroll anchor as JSON
        #[arg(long)]
        dump: Option<PathBuf>,
    },

    /// Initialize a new .console-session/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let work_dir = cli.path.unwrap_or_else(|| PathBuf::from("."));

    if let Some(Commands::Init { force }) = cli.command {
        init_logging(cli.verbose, "info");
        return cli::init::init_command(&work_dir, cli.config, force).await;
    }

    let config = Config::resolve(cli.config.as_deref(), &work_dir)?;
    init_logging(cli.verbose, &config.log.level);

    let options = match cli.command {
        Some(Commands::Run {
            tick_ms,
            steps,
            dump,
        }) => cli::run::RunOptions {
            steps,
            tick: Duration::from_millis(tick_ms),
            dump,
        },
        // Default: run with the standard pacing
        _ => cli::run::RunOptions {
            steps: 5,
            tick: Duration::from_millis(200),
            dump: None,
        },
    };

    cli::run::run_command(&config, options).await
}

/// Logs go to stderr so they never interleave with the console's output.
fn init_logging(verbose: bool, configured: &str) {
    let log_level = if verbose { "debug" } else { configured };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}
