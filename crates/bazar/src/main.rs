// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bazar - realtime delivery and recommendation core for a marketplace.
//!
//! This is the binary entry point for the Bazar service.

use clap::{Parser, Subcommand};

mod serve;

/// Bazar - realtime delivery and recommendation core.
#[derive(Parser, Debug)]
#[command(name = "bazar", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway and scheduled recommendation batch.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match bazar_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            bazar_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("bazar: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        let config = bazar_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.service.name, "bazar");
    }
}
