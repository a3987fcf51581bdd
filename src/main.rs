//! failsense - Main entry point
//!
//! Machine failure prediction: batch training and single-row inference.

use clap::Parser;
use failsense::cli::{cmd_info, cmd_interactive, cmd_predict, cmd_train, Cli, Commands};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "failsense=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train {
            data,
            artifacts,
            threshold,
            seed,
            n_estimators,
        }) => {
            cmd_train(&data, &artifacts, threshold, seed, n_estimators)?;
        }
        Some(Commands::Predict {
            data,
            artifacts,
            output,
            threshold,
        }) => {
            cmd_predict(&data, &artifacts, output.as_deref(), threshold)?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(&data)?;
        }
        None => {
            // Default: the interactive prediction form
            cmd_interactive(&PathBuf::from("artifacts"))?;
        }
    }

    Ok(())
}
