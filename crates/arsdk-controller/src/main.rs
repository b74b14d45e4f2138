//! `arsdk-decode`: decode hex-encoded ARSDK commands and log what they carry.

use std::{process::ExitCode, sync::Arc};

use arsdk_controller::{CommandRouter, ControllerError, RouterConfig, TerrainLogger};
use arsdk_proto::{DecodeConfig, DispatchTable, Dispatched};
use arsdk_terrain::Terrain;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "arsdk-decode")]
#[command(about = "Decode ARSDK feature commands given as hex")]
struct Args {
    /// Reject commands with bytes after the last declared argument
    #[arg(long)]
    strict: bool,

    /// Report unknown features and opcodes as failures instead of skipping them
    #[arg(long)]
    surface_version_skew: bool,

    /// Commands as hex, header included (for example 009b0200)
    #[arg(value_name = "HEX", required = true)]
    commands: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = RouterConfig {
        decode: if args.strict { DecodeConfig::strict() } else { DecodeConfig::default() },
        surface_version_skew: args.surface_version_skew,
    };

    let router = match build_router(config) {
        Ok(router) => router,
        Err(err) => {
            error!(error = %err, "cannot build command router");
            return ExitCode::FAILURE;
        },
    };

    let mut failures = 0usize;
    for input in &args.commands {
        match decode(&router, input) {
            Ok(Some(outcome)) => {
                let (feature, command) = (outcome.feature, outcome.command);
                info!(input = %input, feature, command, "decoded");
            },
            Ok(None) => info!(input = %input, "skipped, not known to this build"),
            Err(err) => {
                error!(input = %input, error = %err, "decode failed");
                failures += 1;
            },
        }
    }

    if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn build_router(config: RouterConfig) -> Result<CommandRouter, ControllerError> {
    let router = CommandRouter::new(DispatchTable::builder().feature::<Terrain>(), config)?;
    router.register::<Terrain>(Arc::new(TerrainLogger))?;
    Ok(router)
}

fn decode(router: &CommandRouter, input: &str) -> Result<Option<Dispatched>, ControllerError> {
    let bytes = hex::decode(input.trim())?;
    router.receive(&bytes)
}
