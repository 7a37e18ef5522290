// tests/export_files.rs
use std::fs;
use tempfile::TempDir;

use rp5_archive::config::Config;
use rp5_archive::errors::{ArchiveError, ExportError};
use rp5_archive::export::export_table;
use rp5_archive::models::weather_table::{headers, WeatherRecord, WeatherTable, OBSERVATION_COUNT};
use rp5_archive::worker::{self, Source};

fn record(date: &str, time: &str, temperature: &str) -> WeatherRecord {
    let mut observations: [String; OBSERVATION_COUNT] = Default::default();
    observations[0] = temperature.to_string();
    observations[5] = "wind, from the north".to_string();
    WeatherRecord { date: date.to_string(), time: time.to_string(), observations }
}

fn table() -> WeatherTable {
    WeatherTable {
        columns: headers(),
        records: vec![record("2024-01-01", "03:00", "-2.3"), record("2024-01-01", "06:00", "-1.0")],
    }
}

#[test]
fn csv_has_header_and_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/out.csv");

    let written = export_table(&table(), &path).unwrap();
    assert_eq!(written, path);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.len(), 29);
    assert_eq!(&header[0], "date");
    assert_eq!(&header[2], "temperature°C");

    let rows = reader.records().map(|r| r.unwrap()).collect::<Vec<_>>();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "03:00");
    assert_eq!(&rows[0][2], "-2.3");
    assert_eq!(&rows[0][7], "wind, from the north");
    assert_eq!(&rows[1][28], "");
}

#[test]
fn tsv_uses_tabs_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.tsv");
    fs::write(&path, "stale content").unwrap();

    export_table(&table(), &path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("stale"));
    let first = contents.lines().next().unwrap();
    assert_eq!(first.split('\t').count(), 29);
    assert_eq!(contents.lines().count(), 3);
}

#[test]
fn xlsx_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");

    export_table(&table(), &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let err = export_table(&table(), &dir.path().join("out.json")).unwrap_err();
    assert!(matches!(err, ExportError::Format(_)));
}

fn config_in(dir: &TempDir, output: &str) -> Config {
    let mut config = Config::default();
    config.files.output = dir.path().join(output);
    config
}

#[test]
fn snapshot_run_writes_output_and_backup() {
    let dir = TempDir::new().unwrap();
    let html_path = dir.path().join("page.html");
    fs::write(&html_path, concat!(
        r#"<table id="archiveTable"><tr><td>header</td></tr>"#,
        r#"<tr><td class="cl_dt">2024-01-01</td></tr>"#,
        r#"<tr><td><div class="dfs">03:00</div></td><td></td><td><div class="t_0">-2.3</div></td></tr>"#,
        "</table>",
    )).unwrap();

    let mut config = config_in(&dir, "weather.csv");
    config.files.snapshot_dir = Some(dir.path().join("snapshots"));

    let written = worker::run(&config, Source::Snapshot(html_path)).unwrap();
    assert_eq!(written, Some(dir.path().join("weather.csv")));

    let contents = fs::read_to_string(dir.path().join("weather.csv")).unwrap();
    assert!(contents.contains("2024-01-01,03:00,-2.3"));

    let snapshots = fs::read_dir(dir.path().join("snapshots")).unwrap().count();
    assert_eq!(snapshots, 2);
}

#[test]
fn failing_backup_still_exports() {
    let dir = TempDir::new().unwrap();
    let html_path = dir.path().join("page.html");
    fs::write(&html_path, concat!(
        r#"<table id="archiveTable"><tr><td>header</td></tr>"#,
        r#"<tr><td class="cl_dt">2024-01-01</td></tr>"#,
        r#"<tr><td><div class="dfs">03:00</div></td></tr>"#,
        "</table>",
    )).unwrap();

    // a regular file where the snapshot directory's parent should be
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let mut config = config_in(&dir, "weather.csv");
    config.files.snapshot_dir = Some(blocker.join("snaps"));

    let written = worker::run(&config, Source::Snapshot(html_path)).unwrap();
    assert_eq!(written, Some(dir.path().join("weather.csv")));
    assert!(dir.path().join("weather.csv").exists());
}

#[test]
fn snapshot_without_table_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let html_path = dir.path().join("page.html");
    fs::write(&html_path, "<html><body>maintenance</body></html>").unwrap();

    let config = config_in(&dir, "weather.xlsx");
    let written = worker::run(&config, Source::Snapshot(html_path)).unwrap();

    assert_eq!(written, None);
    assert!(!dir.path().join("weather.xlsx").exists());
}

#[test]
fn missing_snapshot_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, "weather.csv");

    let err = worker::run(&config, Source::Snapshot(dir.path().join("absent.html"))).unwrap_err();
    assert!(matches!(err, ArchiveError::Snapshot(_)));
}
