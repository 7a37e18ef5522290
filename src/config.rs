use std::fs;
use std::path::PathBuf;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

pub const DEFAULT_URL: &str = "https://rp5.ru/%E5%8D%97%E4%BA%AC%E5%B8%82(%E6%9C%BA%E5%9C%BA)%E5%8E%86%E5%8F%B2%E5%A4%A9%E6%B0%94_";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0 Safari/537.36";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_path: "rp5-archive.log".to_string(),
            log_level: LevelFilter::Info,
            log_to_stdout: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BrowserParameters {
    pub executable_path: Option<PathBuf>,
    pub user_data_dir: PathBuf,
    pub user_agent: String,
    pub headless: bool,
    pub page_load_timeout_secs: u64,
    pub element_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for BrowserParameters {
    fn default() -> Self {
        Self {
            executable_path: None,
            user_data_dir: PathBuf::from("/tmp/chrome_user_data"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            page_load_timeout_secs: 10,
            element_timeout_secs: 10,
            poll_interval_ms: 250,
        }
    }
}

/// Locators and timings of the archive page
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiteParameters {
    pub url: String,
    pub archive_tab: String,
    pub table_id: String,
    pub range_label_xpath: String,
    pub apply_button: String,
    pub settle_delay_secs: u64,
    pub reload_timeout_secs: u64,
}

impl Default for SiteParameters {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            archive_tab: "#tabSynopArchive".to_string(),
            table_id: "archiveTable".to_string(),
            range_label_xpath: r#"//label[@id="input_radio" and contains(., "7天")]"#.to_string(),
            apply_button: "div.archButton > div.inner".to_string(),
            settle_delay_secs: 2,
            reload_timeout_secs: 5,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Files {
    pub output: PathBuf,
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_retention_hours: i64,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            output: PathBuf::from("nanjing_airport_weather.xlsx"),
            snapshot_dir: None,
            snapshot_retention_hours: 168,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub browser: BrowserParameters,
    pub site: SiteParameters,
    pub files: Files,
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    parse_config(&toml)
}

/// Parses configuration from a TOML document, any missing item gets its default
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.site.table_id.trim().is_empty() {
        return Err(ConfigError::from("site.table_id must not be empty"));
    }
    if config.files.snapshot_retention_hours < 0 {
        return Err(ConfigError::from("files.snapshot_retention_hours must not be negative"));
    }
    if config.browser.poll_interval_ms == 0 {
        return Err(ConfigError::from("browser.poll_interval_ms must be greater than zero"));
    }

    Ok(config)
}
