use serde::Serialize;

/// Number of measurement columns following date and time
pub const OBSERVATION_COUNT: usize = 27;

/// Total number of exported columns (date, time and all observations)
pub const COLUMN_COUNT: usize = OBSERVATION_COUNT + 2;

/// Name of the column filled from the carried-forward date header
pub const DATE_COLUMN: &str = "date";

/// Class marking the row-span date cell that starts a new day in the archive table
pub const DATE_MARKER: &str = "cl_dt";

/// Where a column lives in an archive table row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub index: usize,
    pub marker: Option<&'static str>,
}

const fn col(name: &'static str, index: usize, marker: Option<&'static str>) -> ColumnSpec {
    ColumnSpec { name, index, marker }
}

/// The time column, read from the nested `dfs` element of the first cell
pub const TIME_COLUMN: ColumnSpec = col("time", 0, Some("dfs"));

/// Observation columns in export order.
///
/// Index 1 is the local/UTC time cell and index 28 is never read, the site layout
/// places snow depth at 29.
pub const OBSERVATION_COLUMNS: [ColumnSpec; OBSERVATION_COUNT] = [
    col("temperature°C", 2, Some("t_0")),
    col("station_pressure_mmHg", 3, Some("p_0")),
    col("sea_level_pressure_mmHg", 4, Some("p_0")),
    col("pressure_tendency_mmHg", 5, Some("p_0")),
    col("relative_humidity%", 6, None),
    col("wind_direction", 7, None),
    col("wind_speed_m/s", 8, Some("wv_0")),
    col("max_gust_10min_m/s", 9, Some("wv_0")),
    col("max_gust_between_obs_m/s", 10, Some("wv_0")),
    col("total_cloud_cover", 11, None),
    col("present_weather", 12, None),
    col("past_weather_1", 13, None),
    col("past_weather_2", 14, None),
    col("min_temperature°C", 15, Some("t_0")),
    col("max_temperature°C", 16, Some("t_0")),
    col("cloud_type", 17, None),
    col("cloud_amount", 18, None),
    col("lowest_cloud_height_m", 19, None),
    col("mid_level_clouds", 20, None),
    col("high_level_clouds", 21, None),
    col("visibility_km", 22, Some("vv_0")),
    col("dew_point°C", 23, Some("t_0")),
    col("precipitation_mm", 24, Some("pr_0")),
    col("precipitation_period", 25, None),
    col("soil_condition", 26, None),
    col("soil_min_temperature°C", 27, Some("t_0")),
    col("snow_depth_cm", 29, Some("vv_0")),
];

/// Returns the full header list in export order
pub fn headers() -> Vec<&'static str> {
    let mut headers = Vec::with_capacity(COLUMN_COUNT);
    headers.push(DATE_COLUMN);
    headers.push(TIME_COLUMN.name);
    headers.extend(OBSERVATION_COLUMNS.iter().map(|c| c.name));
    headers
}

/// One observation row of the archive table, all values kept as raw strings
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WeatherRecord {
    pub date: String,
    pub time: String,
    pub observations: [String; OBSERVATION_COUNT],
}

impl WeatherRecord {
    /// Returns the value of a column by header name
    ///
    /// # Arguments
    ///
    /// * 'name' - header name as listed by `headers()`
    pub fn get(&self, name: &str) -> Option<&str> {
        if name == DATE_COLUMN {
            return Some(&self.date);
        }
        if name == TIME_COLUMN.name {
            return Some(&self.time);
        }
        OBSERVATION_COLUMNS
            .iter()
            .position(|c| c.name == name)
            .map(|i| self.observations[i].as_str())
    }

    /// Returns all values in header order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [self.date.as_str(), self.time.as_str()]
            .into_iter()
            .chain(self.observations.iter().map(String::as_str))
    }
}

/// Ordered set of records extracted from one DOM snapshot
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WeatherTable {
    pub columns: Vec<&'static str>,
    pub records: Vec<WeatherRecord>,
}

impl WeatherTable {
    /// Returns a table with the full header and no records
    pub fn empty() -> Self {
        Self { columns: headers(), records: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for WeatherTable {
    fn default() -> Self {
        Self::empty()
    }
}
