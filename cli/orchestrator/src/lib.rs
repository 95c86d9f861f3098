#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Command-line front end for ldgen.
//!
//! Flags override values from the configuration file, which override
//! built-in defaults.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use codegen::FileSink;
use config::{Config, ConfigError};
use http::RoutingTransport;
use logging::LoggingError;
use pipeline::{CompileReport, PipelineError};
use thiserror::Error;
use transport::{DynTransport, TransportConfig, TransportError};

/// Errors that can occur during a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    /// No specification given on the command line or in the configuration.
    #[error("no specification given; pass SPEC or set codegen.input_path")]
    MissingSpec,
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Logging could not be initialised.
    #[error(transparent)]
    Logging(#[from] LoggingError),
    /// The transport backends could not be built.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Compilation failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Command-line interface configuration for ldgen.
#[derive(Parser, Debug)]
#[command(
    name = "ldgen",
    about = "Generate a Linked Data REST API (routes, queries, pipe-modules) from a YAML specification",
    version
)]
pub struct Cli {
    /// Root YAML specification (path, file:// URI or http(s) URL)
    pub spec: Option<String>,
    /// Directory receiving executeQuery.js, pipeModules.js and routes.js
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Log level or filter directive, e.g. `debug` or `pipeline=trace,info`
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Effective settings after merging flags and configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Root specification location
    pub spec: String,
    /// Output directory
    pub output_dir: PathBuf,
    /// Log filter
    pub log_level: String,
    /// Optional log file
    pub log_file: Option<PathBuf>,
    /// Network settings
    pub transport: TransportConfig,
}

impl Cli {
    /// Load the configuration file named by `--config`, or the default one.
    ///
    /// An explicit file must exist; the default file is optional.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Ok(Config::from_file(path)?),
            None => match Config::default_path() {
                Ok(path) => Ok(Config::load_or_default(path)?),
                Err(ConfigError::ConfigDirUnavailable) => Ok(Config::default()),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Merge flags over `config`.
    pub fn settings(&self, config: Config) -> Result<Settings> {
        let spec = match (&self.spec, &config.codegen.input_path) {
            (Some(spec), _) => spec.clone(),
            (None, Some(path)) => path.to_string_lossy().into_owned(),
            (None, None) => return Err(CliError::MissingSpec),
        };
        Ok(Settings {
            spec,
            output_dir: self.output.clone().unwrap_or(config.codegen.output_dir),
            log_level: self.log_level.clone().unwrap_or(config.logging.level),
            log_file: config.logging.file,
            transport: config.transport,
        })
    }
}

/// Compile `settings.spec` into `settings.output_dir`.
pub async fn run(settings: &Settings) -> Result<CompileReport> {
    let transport: DynTransport = Arc::new(RoutingTransport::new(settings.transport.clone())?);
    let sink = Arc::new(FileSink::new(&settings.output_dir));
    Ok(pipeline::compile(&settings.spec, sink, transport).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "ldgen",
            "api.yaml",
            "-o",
            "out",
            "--log-level",
            "debug",
        ])
        .expect("parse");
        let mut config = Config::default();
        config.codegen.output_dir = PathBuf::from("from-config");
        config.logging.level = "warn".into();

        let settings = cli.settings(config).expect("settings");
        assert_eq!(settings.spec, "api.yaml");
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_config_supplies_defaults() {
        let cli = Cli::try_parse_from(["ldgen"]).expect("parse");
        let mut config = Config::default();
        config.codegen.input_path = Some(PathBuf::from("spec/api.yaml"));
        config.codegen.output_dir = PathBuf::from("from-config");

        let settings = cli.settings(config).expect("settings");
        assert_eq!(settings.spec, "spec/api.yaml");
        assert_eq!(settings.output_dir, PathBuf::from("from-config"));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_missing_spec() {
        let cli = Cli::try_parse_from(["ldgen"]).expect("parse");
        assert!(matches!(cli.settings(Config::default()), Err(CliError::MissingSpec)));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let cli = Cli::try_parse_from(["ldgen", "-c", "/nonexistent/ldgen.toml", "api.yaml"])
            .expect("parse");
        assert!(matches!(cli.load_config(), Err(CliError::Config(_))));
    }
}
