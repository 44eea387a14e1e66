//! actmine CLI entry point.
//!
//! # Commands
//!
//! - `actmine patterns <log>` - List the patterns found in a log
//! - `actmine discover <log>` - Print the activity hierarchy and instances
//! - `actmine rebuild <log>` - Rewrite a log with compound activity events
//! - `actmine loops <log>` - Find strict loops
//! - `actmine config show|init|path` - Manage configuration
//! - `actmine completions <shell>` - Generate shell completions

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use actmine::cli::{Cli, Commands, ConfigCommands};

mod commands;

/// `RUST_LOG` wins over the flags when set.
fn setup_logging(verbose: bool, quiet: bool) {
    let default = if quiet {
        "error"
    } else if verbose {
        "actmine=debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Patterns {
            input,
            patterns,
            json,
        } => commands::patterns::handle(config_path, &input, &patterns, json),
        Commands::Discover {
            input,
            patterns,
            activities,
            activity_logs,
            unattached,
            json,
        } => commands::discover::handle(
            config_path,
            &input,
            &patterns,
            &activities,
            commands::discover::Outputs {
                activity_logs: activity_logs.as_deref(),
                unattached: unattached.as_deref(),
                json,
            },
        ),
        Commands::Rebuild {
            input,
            patterns,
            activities,
            undefined,
            naming,
            levels,
            until_stable,
            json,
            reverse_hierarchy,
            output,
        } => commands::rebuild::handle(
            config_path,
            &input,
            &patterns,
            &activities,
            commands::rebuild::RebuildArgs {
                undefined,
                naming,
                levels,
                until_stable,
                json,
                reverse_hierarchy,
                output,
            },
        ),
        Commands::Loops {
            input,
            max_period,
            json,
        } => commands::loops::handle(config_path, &input, max_period, json),
        Commands::Config(command) => match command {
            ConfigCommands::Show => commands::config::handle_show(config_path),
            ConfigCommands::Init { force } => commands::config::handle_init(config_path, force),
            ConfigCommands::Path => commands::config::handle_path(config_path),
        },
        Commands::Completions { shell } => commands::completions::handle(shell),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
