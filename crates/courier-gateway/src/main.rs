//! courier-gateway: Telegram bot main binary
//!
//! Usage:
//!   courier-gateway                  - Poll for updates until Ctrl+C
//!   courier-gateway --once           - Poll a single time and exit
//!   courier-gateway --config <path>  - Load settings from a TOML file
//!   courier-gateway --help           - Show help

mod commands;
mod processor;

use std::path::PathBuf;
use std::sync::Arc;

use courier_core::Config;
use courier_telegram::TelegramBot;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use crate::commands::register_builtin_commands;
use crate::processor::ProxyFileProcessor;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Poll until shutdown
    Run,
    /// Poll once and exit
    Once,
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
struct Args {
    mode: RunMode,
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = parse_args(std::env::args().skip(1)).map_err(|e| anyhow::anyhow!(e))?;

    match args.mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("courier-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = match &args.config_path {
        Some(path) => Config::from_toml_file(path),
        None => Config::load(),
    }
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting courier-gateway...");

    let processor = ProxyFileProcessor::new(&config.proxy)
        .map_err(|e| anyhow::anyhow!("Failed to create proxy checker: {}", e))?;

    let bot = TelegramBot::new(&config.telegram)
        .map_err(|e| anyhow::anyhow!("Failed to create Telegram bot: {}", e))?
        .with_file_processor(Arc::new(processor));
    register_builtin_commands(&bot);

    tracing::info!("Registered commands: {:?}", bot.command_names());

    if args.mode == RunMode::Once {
        let mut cursor = None;
        let count = bot.poll_once(&mut cursor).await?;
        bot.confirm(cursor).await?;
        tracing::info!("Processed {} updates", count);
        return Ok(());
    }

    run(bot).await
}

/// Poll until Ctrl+C
async fn run(bot: TelegramBot) -> anyhow::Result<()> {
    let bot = Arc::new(bot);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let polling = {
        let bot = Arc::clone(&bot);
        tokio::spawn(async move { bot.run(shutdown_rx).await })
    };

    tracing::info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    // The receiver may already be gone if polling ended on its own
    let _ = shutdown_tx.send(());
    polling.await??;

    tracing::info!("courier-gateway stopped");
    Ok(())
}

/// Parse command line arguments (program name excluded)
fn parse_args<I>(args: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut mode = RunMode::Run;
    let mut config_path = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Args { mode: RunMode::Help, config_path }),
            "--version" | "-v" => return Ok(Args { mode: RunMode::Version, config_path }),
            "--once" => mode = RunMode::Once,
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| format!("{} requires a path", arg))?;
                config_path = Some(PathBuf::from(path));
            }
            other => return Err(format!("Unknown argument: {} (see --help)", other)),
        }
    }

    Ok(Args { mode, config_path })
}

/// Print help message
fn print_help() {
    println!("courier-gateway - Telegram proxy checker bot");
    println!();
    println!("Usage:");
    println!("  courier-gateway                  Poll for updates until Ctrl+C");
    println!("  courier-gateway --once           Poll a single time and exit");
    println!("  courier-gateway --config <path>  Load settings from a TOML file");
    println!("  courier-gateway --help           Show this help message");
    println!("  courier-gateway --version        Show version");
    println!();
    println!("Without --config, ./courier.toml is used when present.");
    println!();
    println!("Environment Variables:");
    println!("  TELEGRAM_BOT_TOKEN             Bot token (required)");
    println!("  TELEGRAM_API_BASE_URL          Bot API endpoint (default: https://api.telegram.org)");
    println!("  TELEGRAM_POLL_INTERVAL_SECS    Seconds between polls (default: 2)");
    println!("  TELEGRAM_REQUEST_TIMEOUT_SECS  HTTP request timeout (default: 30)");
    println!("  PROXY_CONNECT_TIMEOUT_MS       Per-proxy connect timeout (default: 3000)");
    println!("  PROXY_CONCURRENCY              Proxies checked at once (default: 64)");
    println!("  PROXY_OUTPUT_DIR               Result file directory (default: data/results)");
}
