//! HatoMask CLI: photo intake and face detection from the command line.
//!
//! Set HATOMASK_API_URL (or API_URL). See `ClientConfig` for the other
//! `HATOMASK_*` settings.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hatomask_api_client::ApiClient;
use hatomask_cli::{detect_file, init_tracing, parse_container, process_file};
use hatomask_core::{AppError, ClientConfig, ErrorMetadata};
use hatomask_processing::{ContainerBox, IntakePipeline};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hatomask", about = "HatoMask photo intake CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a photo and bring it upright, without contacting the service
    Process {
        /// Path to a JPEG or PNG file
        file: PathBuf,
        /// Write the upright image here
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload a photo, run face detection and print the overlay layout
    Detect {
        /// Path to a JPEG or PNG file
        file: PathBuf,
        /// Preview container size in pixels
        #[arg(long, default_value = "640x480", value_parser = parse_container)]
        container: ContainerBox,
    },
    /// Check the connection to the photo service
    Health,
}

fn print_json(value: &impl Serialize) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("Serialize response: {}", e)))?;
    println!("{}", out);
    Ok(())
}

async fn run(command: Commands, config: &ClientConfig) -> Result<(), AppError> {
    let pipeline = IntakePipeline::from_config(config);

    match command {
        Commands::Process { file, output } => {
            let report = process_file(&pipeline, &file, output.as_deref()).await?;
            print_json(&report)?;
        }
        Commands::Detect { file, container } => {
            let client = ApiClient::from_config(config)?;
            let report = detect_file(&client, &pipeline, &file, container).await?;
            print_json(&report)?;
        }
        Commands::Health => {
            let client = ApiClient::from_config(config)?;
            let hello = client.health().await?;
            print_json(&hello)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env()
        .context("Failed to load configuration. Check HATOMASK_* environment variables")?;

    let cli = Cli::parse();

    if let Err(err) = run(cli.command, &config).await {
        err.log();
        eprintln!("{}", err.user_message(config.locale));
        if let Some(action) = err.suggested_action() {
            eprintln!("{}", action);
        }
        std::process::exit(1);
    }

    Ok(())
}
