use thiserror::Error;
use crate::manager_browser::errors::BrowserError;

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}

#[derive(Error, Debug)]
#[error("LoggingError: {0}")]
pub struct LoggingError(pub String);
impl From<std::io::Error> for LoggingError {
    fn from(e: std::io::Error) -> Self { LoggingError(e.to_string()) }
}
impl From<log4rs::config::runtime::ConfigErrors> for LoggingError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { LoggingError(e.to_string()) }
}
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("ExtractError::TableNotFound: no element with id '{0}'")]
    TableNotFound(String),
    #[error("ExtractError::Selector: {0}")]
    Selector(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("ExportError::Format: unsupported output extension '{0}'")]
    Format(String),
    #[error("ExportError::File: {0}")]
    File(String),
}
impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self { ExportError::File(e.to_string()) }
}
impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self { ExportError::File(e.to_string()) }
}
impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self { ExportError::File(e.to_string()) }
}

#[derive(Error, Debug)]
#[error("BackupError: {0}")]
pub struct BackupError(pub String);
impl From<std::io::Error> for BackupError {
    fn from(e: std::io::Error) -> Self { BackupError(e.to_string()) }
}
impl From<serde_json::Error> for BackupError {
    fn from(e: serde_json::Error) -> Self { BackupError(format!("json document error: {}", e)) }
}
impl From<glob::PatternError> for BackupError {
    fn from(e: glob::PatternError) -> Self { BackupError(e.to_string()) }
}

/// Error aborting one archive run
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("ArchiveError::Snapshot: {0}")]
    Snapshot(String),
}
impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self { ArchiveError::Snapshot(e.to_string()) }
}
