use std::fs;
use std::path::{Path, PathBuf};
use csv::WriterBuilder;
use log::info;
use rust_xlsxwriter::{Format, Workbook};
use crate::errors::ExportError;
use crate::models::weather_table::WeatherTable;

const SHEET_NAME: &str = "weather";

/// Spreadsheet formats, chosen by the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Tsv,
}

impl ExportFormat {
    /// Returns the format matching the extension of the given path (case-insensitive)
    ///
    /// # Arguments
    ///
    /// * 'path' - the output path
    pub fn from_path(path: &Path) -> Result<ExportFormat, ExportError> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            _ => Err(ExportError::Format(ext)),
        }
    }
}

/// Writes the table with its header row to the given path, overwriting any existing file.
/// Returns the path written.
///
/// # Arguments
///
/// * 'table' - the table to export
/// * 'path' - output file, its extension selects the format
pub fn export_table(table: &WeatherTable, path: &Path) -> Result<PathBuf, ExportError> {
    let format = ExportFormat::from_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match format {
        ExportFormat::Xlsx => write_xlsx(table, path)?,
        ExportFormat::Csv => write_delimited(table, path, b',')?,
        ExportFormat::Tsv => write_delimited(table, path, b'\t')?,
    }

    info!("wrote {} records to {}", table.len(), path.display());
    Ok(path.to_path_buf())
}

fn write_xlsx(table: &WeatherTable, path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    for (row, record) in table.records.iter().enumerate() {
        for (col, value) in record.values().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, value)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_delimited(table: &WeatherTable, path: &Path, delimiter: u8) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(&table.columns)?;
    for record in &table.records {
        writer.write_record(record.values())?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a/b.xlsx")).unwrap(), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::from_path(Path::new("b.CSV")).unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("b.tsv")).unwrap(), ExportFormat::Tsv);
        assert!(matches!(ExportFormat::from_path(Path::new("b.txt")), Err(ExportError::Format(e)) if e == "txt"));
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }
}
