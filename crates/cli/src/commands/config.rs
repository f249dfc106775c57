use clap::Subcommand;
use nqi_core::{config::AppConfig, upstream::ProviderSet};
use std::path::Path;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the current configuration
    Validate {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show the effective configuration as TOML
    Show {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,

        /// Show provider URLs (they usually embed API keys)
        #[arg(long)]
        show_sensitive: bool,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file, show_sensitive } => show_config(&file, show_sensitive),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));

    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    let providers = ProviderSet::from_config(&config.providers);
    let dropped = config.providers.premium.len().saturating_sub(providers.premium_count());

    println!("Configuration Summary:");
    println!("  Server: {}:{}", config.server.bind_address, config.server.bind_port);
    println!(
        "  Providers: {} premium + public fallback ({})",
        providers.premium_count(),
        config.providers.public_name
    );
    if dropped > 0 {
        println!("  Dropped: {dropped} premium entries with invalid URLs or duplicate names");
    }
    println!(
        "  Sampling: {} probes, {}ms timeout, {}ms floor",
        config.sampling.samples_per_provider,
        config.sampling.timeout_ms,
        config.sampling.execution_floor_ms
    );
    println!(
        "  Smoothing: {}",
        if config.smoothing.enabled {
            format!("enabled (alpha {})", config.smoothing.alpha)
        } else {
            "disabled".to_string()
        }
    );

    Ok(())
}

/// Renders the effective configuration, masking provider URLs unless asked not to.
pub fn render_config(config: &AppConfig, show_sensitive: bool) -> CliResult<String> {
    let mut config = config.clone();
    if !show_sensitive {
        for entry in &mut config.providers.premium {
            entry.url = "[hidden - use --show-sensitive to reveal]".to_string();
        }
    }
    Ok(toml::to_string_pretty(&config)?)
}

fn show_config(file: &str, show_sensitive: bool) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    println!("# Effective configuration from {file} (with environment overrides)");
    println!("{}", render_config(&config, show_sensitive)?);

    Ok(())
}

pub const SAMPLE_CONFIG: &str = r#"# Solana Network Quality Index configuration
# Every value below is the compiled default unless noted.

environment = "development"

[server]
bind_address = "127.0.0.1"
bind_port = 3030
max_concurrent_requests = 64

# Premium endpoints. QUICKNODE_RPC and HELIUS_RPC in the environment append
# providers named "QuickNode" and "Helius".
# [[providers.premium]]
# name = "Helius"
# url = "https://mainnet.helius-rpc.com/?api-key=YOUR_API_KEY"

[providers]
public_name = "Public RPC"
public_url = "https://api.mainnet-beta.solana.com"

[sampling]
samples_per_provider = 7
sleep_ms = 120
timeout_ms = 2500
execution_floor_ms = 120
warmup = true
commitment = "confirmed"
# overall_deadline_ms = 20000

[scoring]
max_slot_lag = 200
max_slot_penalty = 25.0

[scoring.weights]
latency = 0.60
failure = 0.33
jitter = 0.07

[smoothing]
enabled = true
alpha = 0.25

[response]
include_debug = true
fee_efficiency = 0.00002
# build = "v0.1.0"
# deployment = "nqi.example.com"

[logging]
level = "info"
format = "pretty"
"#;

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    if Path::new(output).exists() && !force {
        return Err(CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(output, SAMPLE_CONFIG)?;

    print_success(&format!("Sample configuration written to {output}"));
    print_info("Add premium providers under [[providers.premium]] or via QUICKNODE_RPC / HELIUS_RPC");

    Ok(())
}
