use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta};
use glob::glob;
use log::{debug, warn};
use crate::errors::BackupError;
use crate::models::weather_table::WeatherTable;

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Saves the rendered page and the table extracted from it, then removes snapshot files
/// older than the retention period
///
/// # Arguments
///
/// * 'snapshot_dir' - the directory to save the files to
/// * 'date_time' - the date and time the snapshot represents
/// * 'html' - page content as rendered by the browser
/// * 'table' - the table extracted from the page
/// * 'retention_hours' - snapshot files older than this are removed
pub fn save_snapshot(
    snapshot_dir: &Path,
    date_time: DateTime<Local>,
    html: &str,
    table: &WeatherTable,
    retention_hours: i64) -> Result<Vec<PathBuf>, BackupError> {

    fs::create_dir_all(snapshot_dir)?;
    let stamp = date_time.format(STAMP_FORMAT).to_string();

    let html_path = snapshot_dir.join(format!("{}_page.html", stamp));
    fs::write(&html_path, html)?;

    let table_path = snapshot_dir.join(format!("{}_table.json", stamp));
    let json = serde_json::to_string_pretty(table)?;
    fs::write(&table_path, json)?;

    debug!("snapshot saved to {} and {}", html_path.display(), table_path.display());

    prune_snapshots(snapshot_dir, date_time, retention_hours)?;

    Ok(vec![html_path, table_path])
}

/// Removes snapshot files older than the retention period, relative to the given time.
/// Files whose names don't start with a timestamp are left alone.
///
/// # Arguments
///
/// * 'snapshot_dir' - the directory holding snapshot files
/// * 'now' - reference time
/// * 'retention_hours' - max age of kept files
pub fn prune_snapshots(snapshot_dir: &Path, now: DateTime<Local>, retention_hours: i64) -> Result<usize, BackupError> {
    if retention_hours < 0 {
        return Err(BackupError(format!("negative snapshot retention: {} hours", retention_hours)));
    }
    // a retention beyond the representable range keeps everything
    let Some(retention) = TimeDelta::try_hours(retention_hours) else { return Ok(0) };

    let mut removed: usize = 0;

    for suffix in ["_page.html", "_table.json"] {
        let pattern = format!("{}/*{}", snapshot_dir.display(), suffix);
        for entry in glob(&pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => { warn!("unreadable snapshot entry: {}", e); continue; }
            };
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else { continue };
            let Some(stamp) = filename.get(0..14) else { continue };

            let Ok(saved) = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT) else { continue };
            if now.naive_local() - saved > retention {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
    }

    if removed > 0 {
        debug!("removed {} old snapshot files", removed);
    }

    Ok(removed)
}
