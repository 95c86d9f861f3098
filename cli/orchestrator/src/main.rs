//! ldgen CLI
//!
//! Compiles a YAML specification into the generated Linked Data API
//! modules. Exits with status 1 and the error message on failure; artifacts
//! already written are left in place.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use clap::Parser;
use ldgen_cli::{run, Cli, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = execute(cli).await {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    let settings = cli.settings(config)?;
    logging::init(&settings.log_level, settings.log_file.as_deref())?;

    let report = run(&settings).await?;
    tracing::info!("generated {} into {}", report, settings.output_dir.display());
    println!("Generated {} into {}", report, settings.output_dir.display());
    Ok(())
}
