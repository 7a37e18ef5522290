use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("BrowserError::Launch: {0}")]
    Launch(String),
    #[error("BrowserError::Timeout: {0}")]
    Timeout(String),
    #[error("BrowserError::Script: {0}")]
    Script(String),
}
