use clap::{Parser, Subcommand};
use nqi_core::config::DEFAULT_CONFIG_PATH;
use tracing_subscriber::EnvFilter;

mod commands;
use commands::{
    handle_config_command, run_fetch, run_snapshot, utils::print_error, ConfigCommands,
};

#[derive(Parser)]
#[command(name = "nqi-cli")]
#[command(about = "NQI CLI - Sample Solana RPC providers and inspect the Network Quality Index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log verbosity for the sampling engine (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one snapshot locally against the configured providers
    Snapshot {
        /// Path to config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,

        /// Print the raw JSON payload instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch the current payload from a running server
    Fetch {
        /// Server base URL
        #[arg(short, long, default_value = "http://127.0.0.1:3030")]
        url: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,

        /// Print the raw JSON payload instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,nqi_core={level},cli={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Snapshot { config, json } => run_snapshot(&config, json).await,
        Commands::Fetch { url, timeout, json } => run_fetch(&url, timeout, json).await,
        Commands::Config(config_command) => handle_config_command(config_command),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
