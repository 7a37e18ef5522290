use std::collections::HashMap;
use log::{debug, trace};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use crate::errors::ExtractError;
use crate::models::weather_table::{
    headers, ColumnSpec, WeatherRecord, WeatherTable, DATE_MARKER, OBSERVATION_COLUMNS, TIME_COLUMN,
};

/// Extracts weather records from the archive table of a rendered page.
///
/// The archive table starts each day with a row-span date cell, the date is carried forward
/// to the observation rows that follow it. Every observation value is read with the same
/// rule: the text of the nested marker element if there is one, otherwise the whole cell
/// text, and an empty string when the row is too short.
pub struct TableExtractor {
    table_id: String,
    table: Selector,
    row: Selector,
    cell: Selector,
    date_marker: Selector,
    markers: HashMap<&'static str, Selector>,
}

impl TableExtractor {
    /// Returns a TableExtractor with all selectors compiled
    ///
    /// # Arguments
    ///
    /// * 'table_id' - the id attribute of the archive table
    pub fn new(table_id: &str) -> Result<Self, ExtractError> {
        let mut markers = HashMap::new();
        for marker in OBSERVATION_COLUMNS.iter().chain([&TIME_COLUMN]).filter_map(|c| c.marker) {
            if !markers.contains_key(marker) {
                markers.insert(marker, class_selector(marker)?);
            }
        }

        Ok(Self {
            table_id: table_id.to_string(),
            table: parse_selector(&format!(r#"table[id="{}"]"#, table_id))?,
            row: parse_selector("tr")?,
            cell: parse_selector("td")?,
            date_marker: class_selector(DATE_MARKER)?,
            markers,
        })
    }

    /// Parses the given page and extracts the archive table.
    ///
    /// Fails only if the table itself can't be found, individual cells never fail.
    ///
    /// # Arguments
    ///
    /// * 'html' - the page content as rendered by the browser
    pub fn extract(&self, html: &str) -> Result<WeatherTable, ExtractError> {
        let document = Html::parse_document(html);
        let table = document
            .select(&self.table)
            .next()
            .ok_or_else(|| ExtractError::TableNotFound(self.table_id.clone()))?;

        let mut records: Vec<WeatherRecord> = Vec::new();
        let mut current_date: Option<String> = None;

        for (i, row) in table.select(&self.row).skip(1).enumerate() {
            let cells = row.select(&self.cell).collect::<Vec<ElementRef>>();
            if cells.is_empty() {
                continue;
            }

            if let Some(date_cell) = row.select(&self.date_marker).next() {
                let date = element_text(date_cell);
                trace!("row {}: date header '{}'", i, date);
                current_date = Some(date).filter(|d| !d.is_empty());
                continue;
            }

            let time = self.marker_text(&cells, &TIME_COLUMN).unwrap_or_default();
            let Some(date) = current_date.as_ref() else {
                trace!("row {}: no date established yet, skipped", i);
                continue;
            };
            if time.is_empty() {
                trace!("row {}: no time value, skipped", i);
                continue;
            }

            let observations = std::array::from_fn(|n| self.resolve_field(&cells, &OBSERVATION_COLUMNS[n]));
            records.push(WeatherRecord { date: date.clone(), time, observations });
        }

        debug!("extracted {} records from table '{}'", records.len(), self.table_id);

        Ok(WeatherTable { columns: headers(), records })
    }

    /// Resolves one field with the two-tier rule, marker text first then the cell text.
    /// A row too short for the column gives an empty string.
    ///
    /// # Arguments
    ///
    /// * 'cells' - all cells of the row
    /// * 'column' - where the field lives
    fn resolve_field(&self, cells: &[ElementRef], column: &ColumnSpec) -> String {
        match cells.get(column.index) {
            Some(cell) => self.marker_text(cells, column).unwrap_or_else(|| element_text(*cell)),
            None => String::new(),
        }
    }

    /// Text of the first nested element carrying the column's marker class, if any
    fn marker_text(&self, cells: &[ElementRef], column: &ColumnSpec) -> Option<String> {
        let cell = cells.get(column.index)?;
        let selector = self.markers.get(column.marker?)?;
        cell.select(selector).next().map(element_text)
    }
}

/// Extracts the archive table from a page with the given table id
///
/// # Arguments
///
/// * 'html' - the page content
/// * 'table_id' - the id attribute of the archive table
pub fn extract_table(html: &str, table_id: &str) -> Result<WeatherTable, ExtractError> {
    TableExtractor::new(table_id)?.extract(html)
}

/// Elements whose boundaries separate words in rendered text
const BLOCK_ELEMENTS: [&str; 12] = ["br", "div", "p", "li", "ul", "ol", "table", "tr", "td", "th", "hr", "img"];

/// Visible text content of an element: line breaks and block boundaries become spaces,
/// inline-hidden elements are left out, and whitespace runs (including non-breaking
/// spaces) are collapsed to single spaces
fn element_text(element: ElementRef) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                if is_hidden(e) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&e.name());
                if block {
                    out.push(' ');
                }
                if let Some(nested) = ElementRef::wrap(child) {
                    collect_text(nested, out);
                }
                if block {
                    out.push(' ');
                }
            },
            _ => {},
        }
    }
}

/// Elements the browser never renders as text, or hidden by an inline style
fn is_hidden(element: &Element) -> bool {
    if matches!(element.name(), "script" | "style" | "template") {
        return true;
    }
    element.attr("style")
        .map(|s| s.replace(' ', "").to_ascii_lowercase().contains("display:none"))
        .unwrap_or(false)
}

fn class_selector(class: &str) -> Result<Selector, ExtractError> {
    parse_selector(&format!(".{}", class))
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector(format!("{}: {}", selector, e)))
}
