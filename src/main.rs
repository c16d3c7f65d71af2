//! apt-backports - Main entry point
//!
//! Resolves the backports source for a Debian-family host and prints it,
//! either as JSON for an external applier or as a preview of the APT files.

use std::io::stdout;
use std::process;

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use apt_backports::applier::{PreviewApplier, SourceApplier};
use apt_backports::cli::{Cli, Commands, ResolveArgs};
use apt_backports::config_file::BackportsConfig;
use apt_backports::facts::OsFacts;
use apt_backports::logic::resolver;
use apt_backports::source::RepositorySourceSpec;

/// Initialize the logger with appropriate settings
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application entry point
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!("CLI arguments parsed");

    match cli.command {
        Commands::Detect { os_release } => {
            let facts = match os_release {
                Some(path) => OsFacts::from_os_release_file(path)?,
                None => OsFacts::detect()?,
            };
            println!("{}", serde_json::to_string_pretty(&facts)?);
        }
        Commands::Resolve { args, compact } => {
            let spec = resolve_or_exit(&args);
            let json = if compact {
                serde_json::to_string(&spec)?
            } else {
                spec.to_json_pretty()?
            };
            println!("{}", json);
        }
        Commands::Preview { args } => {
            let spec = resolve_or_exit(&args);
            let mut applier = PreviewApplier::new(stdout().lock());
            applier.apply(&spec)?;
        }
        Commands::Validate { config } => {
            info!("Validating configuration file: {:?}", config);
            match BackportsConfig::load_from_file(&config).and_then(|c| c.validate()) {
                Ok(()) => {
                    info!("Configuration validation successful");
                    println!("✓ Configuration file is valid: {:?}", config);
                }
                Err(e) => {
                    error!("Configuration validation failed: {:#}", e);
                    eprintln!("✗ Configuration validation failed: {:#}", e);
                    process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Resolve the source for `args`, exiting with status 1 on any failure
fn resolve_or_exit(args: &ResolveArgs) -> RepositorySourceSpec {
    let result = args.load_inputs().and_then(|(facts, overrides)| {
        info!("Resolving backports for {}", facts);
        resolver::resolve(&facts, &overrides).map_err(anyhow::Error::from)
    });

    match result {
        Ok(spec) => spec,
        Err(e) => {
            error!("Backports resolution failed: {:#}", e);
            eprintln!("✗ {:#}", e);
            process::exit(1);
        }
    }
}
