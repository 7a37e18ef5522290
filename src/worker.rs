use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use chrono::Local;
use log::{error, info, warn};
use crate::backup::save_snapshot;
use crate::config::Config;
use crate::errors::ArchiveError;
use crate::export::export_table;
use crate::extractor::extract_table;
use crate::manager_browser::{close_session, open_session, Locator, Session};
use crate::models::weather_table::WeatherTable;

/// Rows of an archive table holding no observations
const HEADER_ROWS: u64 = 1;

/// Where the page to extract from comes from
pub enum Source {
    Live,
    Snapshot(PathBuf),
}

/// Runs one archive retrieval: fetches the archive page (or reads a saved snapshot),
/// extracts the weather table and exports it.
///
/// Returns the path of the written file, or None if no records were found.
///
/// # Arguments
///
/// * 'config' - the configuration
/// * 'source' - live browser run or an html snapshot saved earlier
pub fn run(config: &Config, source: Source) -> Result<Option<PathBuf>, ArchiveError> {
    let html = match source {
        Source::Live => {
            let session = open_session(&config.browser, None)?;
            let result = fetch_archive_page(&session, config);
            close_session(session);
            result?
        },
        Source::Snapshot(path) => {
            info!("reading page snapshot {}", path.display());
            fs::read_to_string(&path)?
        },
    };

    let table = match extract_table(&html, &config.site.table_id) {
        Ok(table) => table,
        Err(e) => {
            error!("failed to parse archive table: {}", e);
            WeatherTable::empty()
        },
    };
    info!("parsed {} records", table.len());

    let written = write_output(&table, &config.files.output)?;

    if let Some(dir) = &config.files.snapshot_dir {
        if let Err(e) = save_snapshot(dir, Local::now(), &html, &table, config.files.snapshot_retention_hours) {
            error!("failed to save snapshot to {}: {}", dir.display(), e);
        }
    }

    Ok(written)
}

/// Drives the archive page through the "last 7 days" selection and returns the rendered
/// page once the table has been reloaded
///
/// # Arguments
///
/// * 'session' - an open browser session
/// * 'config' - the configuration
pub fn fetch_archive_page(session: &Session, config: &Config) -> Result<String, ArchiveError> {
    let site = &config.site;
    let element_timeout = Duration::from_secs(config.browser.element_timeout_secs);
    let settle_delay = Duration::from_secs(site.settle_delay_secs);
    let rows_css = format!(r#"table[id="{}"] tr"#, site.table_id);

    info!("loading archive page");
    session.navigate(&site.url)?;

    info!("switching to the archive tab");
    session.click_when_ready(&Locator::Css(site.archive_tab.clone()), element_timeout)?;
    thread::sleep(settle_delay);

    info!("waiting for the archive table");
    session.wait_present(&Locator::Css(format!(r#"table[id="{}"]"#, site.table_id)), element_timeout)?;

    info!("selecting the last 7 days");
    session.click_when_ready(&Locator::XPath(site.range_label_xpath.clone()), element_timeout)?;
    thread::sleep(settle_delay);

    let rows_before = session.count_matches(&rows_css)?;
    info!("applying the selection, table has {} rows", rows_before);
    session.click_when_ready(&Locator::Css(site.apply_button.clone()), element_timeout)?;
    let rows_after = session.wait_rows_settled(&rows_css, rows_before, HEADER_ROWS, Duration::from_secs(site.reload_timeout_secs))?;
    info!("table reloaded with {} rows", rows_after);

    Ok(session.content()?)
}

/// Exports the table unless it is empty
///
/// # Arguments
///
/// * 'table' - the extracted table
/// * 'output' - the output file
pub fn write_output(table: &WeatherTable, output: &Path) -> Result<Option<PathBuf>, ArchiveError> {
    if table.is_empty() {
        warn!("no records parsed, nothing written");
        return Ok(None);
    }

    Ok(Some(export_table(table, output)?))
}
