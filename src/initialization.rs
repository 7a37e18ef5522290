use std::path::PathBuf;
use anyhow::{Context, Result};
use log::info;
use crate::config::{load_config, Config};
use crate::errors::ConfigError;
use crate::logging::setup_logger;

pub const USAGE: &str = "Usage: rp5-archive [--config=<file.toml>] [--output=<file.xlsx|csv|tsv>] [--from-html=<file.html>]";

/// Command line arguments
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<String>,
    pub output: Option<PathBuf>,
    pub from_html: Option<PathBuf>,
    pub help: bool,
}

/// Parses command line arguments, the program name must not be included
///
/// # Arguments
///
/// * 'args' - the arguments
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, ConfigError> {
    let mut result = Args::default();

    for arg in args {
        if arg == "-h" || arg == "--help" {
            result.help = true;
        } else if let Some(v) = arg.strip_prefix("--config=") {
            result.config = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--output=") {
            result.output = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--from-html=") {
            result.from_html = Some(PathBuf::from(v));
        } else {
            return Err(ConfigError(format!("unknown argument '{}'\n{}", arg, USAGE)));
        }
    }

    Ok(result)
}

/// Loads configuration, applies command line overrides and starts logging
///
/// # Arguments
///
/// * 'args' - parsed command line arguments
pub fn init(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading configuration from {}", path))?,
        None => Config::default(),
    };

    if let Some(output) = &args.output {
        config.files.output = output.clone();
    }

    setup_logger(&config.general).context("setting up logging")?;
    info!("rp5-archive version: {}", env!("CARGO_PKG_VERSION"));

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_is_all_defaults() {
        assert_eq!(parse_args(Vec::new()).unwrap(), Args::default());
    }

    #[test]
    fn parses_all_options() {
        let parsed = parse_args(args(&["--config=conf.toml", "--output=out.csv", "--from-html=page.html"])).unwrap();
        assert_eq!(parsed.config.as_deref(), Some("conf.toml"));
        assert_eq!(parsed.output, Some(PathBuf::from("out.csv")));
        assert_eq!(parsed.from_html, Some(PathBuf::from("page.html")));
        assert!(!parsed.help);
    }

    #[test]
    fn unknown_argument_fails_with_usage() {
        let err = parse_args(args(&["--station=58238"])).unwrap_err();
        assert!(err.to_string().contains("--station=58238"));
        assert!(err.to_string().contains("Usage"));
    }
}
