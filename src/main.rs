//! excel-mcp: MCP server for Excel workbook manipulation
//!
//! Exposes workbook tools (cells, ranges, formatting, formulas, search,
//! CSV export) to AI assistants over the MCP stdio transport.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use excel_mcp::config;
use excel_mcp::mcp::server::McpServer;

/// MCP server for Excel workbook manipulation.
///
/// Provides workbook tools (cells, ranges, formatting, formulas, search,
/// CSV export) that enable AI assistants to work on `.xlsx` files.
#[derive(Parser, Debug)]
#[command(name = "excel-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout is reserved for protocol frames.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the excel-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "excel-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting excel-mcp server"
    );

    if cfg.allowed_paths.is_empty() {
        info!("No path allowlist configured; all paths are accessible");
    } else {
        info!(
            allowed_paths = ?cfg.allowed_paths,
            "Allowed paths configured"
        );
    }

    // Create MCP server
    let mut server = McpServer::new(cfg.allowed_paths);

    info!("MCP server ready, waiting for client connection...");

    // Run the server
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(server.run());

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn quiet_overrides_everything() {
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
    }

    #[test]
    fn config_level_applies_without_verbosity_flags() {
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
    }

    #[test]
    fn verbosity_flags_escalate() {
        assert_eq!(get_log_level(1, false, "warn"), Level::INFO);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
        assert_eq!(get_log_level(3, false, "warn"), Level::TRACE);
    }
}
