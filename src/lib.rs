pub mod backup;
pub mod config;
pub mod errors;
pub mod export;
pub mod extractor;
pub mod initialization;
pub mod logging;
pub mod manager_browser;
pub mod models;
pub mod worker;
