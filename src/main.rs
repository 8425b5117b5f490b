//! strcode CLI - issue and verify time-limited string tokens
//!
//! Settings come from ~/.strcode/config.json and can be overridden per call
//! with flags or environment variables.

mod config;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Args, Parser, Subcommand};
use strcode_auth::{StrCode, TokenParts};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{ConfigManager, StrcodeConfig};

/// strcode - self-verifying, time-limited string tokens
#[derive(Parser, Debug)]
#[command(name = "strcode")]
#[command(about = "strcode - self-verifying, time-limited string tokens")]
#[command(version)]
#[command(long_version = concat!(env!("GIT_TAG"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    codec: CodecArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the persisted codec settings
#[derive(Args, Debug, Default, Clone)]
struct CodecArgs {
    /// Shared secret (overrides the config file)
    #[arg(long, global = true, env = "STRCODE_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Field separator (overrides the config file)
    #[arg(long, global = true, env = "STRCODE_SEPARATOR")]
    separator: Option<String>,

    /// Token validity in seconds (overrides the config file)
    #[arg(long, global = true, env = "STRCODE_EXPIRES_IN")]
    expires_in: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a payload into a token
    Encode {
        /// Payload to embed (must not contain the separator)
        payload: String,
    },
    /// Verify a token and print its payload
    Decode {
        /// Token produced by `strcode encode`
        token: String,
    },
    /// Show the fields of a token without verifying it
    Inspect {
        /// Token to inspect
        token: String,
    },
    /// Manage global CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the current configuration (secret masked)
    Show,
    /// Store the --secret, --separator and --expires-in values in the config file
    Set,
    /// Remove the config file
    Clear,
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Apply command-line overrides on top of the persisted configuration
fn resolve_config(args: &CodecArgs, mut config: StrcodeConfig) -> StrcodeConfig {
    if let Some(secret) = &args.secret {
        config.secret = Some(secret.clone());
    }
    if let Some(separator) = &args.separator {
        config.separator = separator.clone();
    }
    if let Some(expires_in) = args.expires_in {
        config.expires_in_secs = expires_in;
    }
    config
}

fn build_codec(config: &StrcodeConfig) -> Result<StrCode> {
    let secret = config.secret.as_deref().context(
        "No secret configured. Pass --secret, set STRCODE_SECRET, or run 'strcode config set --secret <SECRET>'",
    )?;

    if config.separator.is_empty() {
        warn!("Empty separator: tokens will only decode when every field is a single character");
    }

    let codec = StrCode::new(secret, config.separator.clone(), config.expires_in())
        .context("Invalid codec settings")?;

    debug!(
        separator = %config.separator,
        expires_in_secs = codec.expires_in().as_secs(),
        "codec ready"
    );

    Ok(codec)
}

fn format_timestamp(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => {
            let local: DateTime<Local> = dt.into();
            local.format("%Y-%m-%d %H:%M:%S %Z").to_string()
        }
        None => "out of range".to_string(),
    }
}

fn handle_encode(config: &StrcodeConfig, payload: &str) -> Result<()> {
    let codec = build_codec(config)?;

    if !config.separator.is_empty() && payload.contains(&config.separator) {
        warn!(
            "Payload contains the separator {:?}; the token will not decode",
            config.separator
        );
    }

    println!("{}", codec.encode(payload));
    info!(
        "Token valid for {} seconds",
        codec.expires_in().as_secs()
    );
    Ok(())
}

fn handle_decode(config: &StrcodeConfig, token: &str) -> Result<()> {
    let codec = build_codec(config)?;
    let payload = codec.decode(token).context("Token rejected")?;
    println!("{}", payload);
    Ok(())
}

fn handle_inspect(config: &StrcodeConfig, token: &str) -> Result<()> {
    let parts = TokenParts::split(token, &config.separator).context("Malformed token")?;

    println!("Payload:    {}", parts.payload);
    println!("Checksum:   {}", parts.checksum);
    match parts.expires_at() {
        Ok(expires_at) => {
            let state = if Utc::now().timestamp() >= expires_at {
                "expired"
            } else {
                "not expired"
            };
            println!(
                "Expires at: {} ({}, {})",
                expires_at,
                format_timestamp(expires_at),
                state
            );
        }
        Err(e) => println!("Expires at: {} (invalid: {})", parts.expires_at, e),
    }
    Ok(())
}

fn handle_config_command(command: &ConfigCommands, overrides: &CodecArgs) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let path = ConfigManager::get_config_path()?;
            let config = ConfigManager::load()?;
            println!("Config file: {}", path.display());
            println!(
                "Secret:      {}",
                config
                    .masked_secret()
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("Separator:   {:?}", config.separator);
            println!("Expires in:  {} seconds", config.expires_in_secs);
            Ok(())
        }
        ConfigCommands::Set => {
            let config = resolve_config(overrides, ConfigManager::load()?);

            if overrides.secret.is_none()
                && overrides.separator.is_none()
                && overrides.expires_in.is_none()
            {
                anyhow::bail!("Nothing to set. Pass --secret, --separator or --expires-in");
            }

            if config.expires_in_secs == 0 {
                anyhow::bail!("--expires-in must be greater than zero");
            }

            ConfigManager::save(&config)?;
            println!("Configuration saved to ~/.strcode/config.json");
            Ok(())
        }
        ConfigCommands::Clear => {
            ConfigManager::clear()?;
            println!("Configuration cleared");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Config { ref command } => handle_config_command(command, &cli.codec),
        Commands::Encode { ref payload } => {
            let config = resolve_config(&cli.codec, ConfigManager::load()?);
            handle_encode(&config, payload)
        }
        Commands::Decode { ref token } => {
            let config = resolve_config(&cli.codec, ConfigManager::load()?);
            handle_decode(&config, token)
        }
        Commands::Inspect { ref token } => {
            let config = resolve_config(&cli.codec, ConfigManager::load()?);
            handle_inspect(&config, token)
        }
    }
}
