// src/io/forecast.rs

use crate::error::{PlannerError, PlannerResult};
use crate::io::demand::ForecastProfile;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of the forecaster's export. Extra columns (dates, actuals) are ignored.
#[derive(Debug, Deserialize)]
struct ForecastRow {
    #[serde(rename = "Forecast")]
    forecast: f64,
    /// Relative residual standard deviation; only the first row is read.
    #[serde(default)]
    stdev: Option<f64>,
}

/// Loads a forecast from the CSV file the caller points at.
///
/// # Arguments
/// * `file_path` - CSV with a `Forecast` column and a `stdev` column whose first
///   row holds the dispersion coefficient.
pub fn load_forecast(file_path: &Path) -> PlannerResult<ForecastProfile> {
    let rdr = csv::Reader::from_path(file_path)?;
    read_rows(rdr)
}

/// Same as [`load_forecast`] for any reader.
pub fn read_forecast<R: Read>(reader: R) -> PlannerResult<ForecastProfile> {
    read_rows(csv::Reader::from_reader(reader))
}

fn read_rows<R: Read>(mut rdr: csv::Reader<R>) -> PlannerResult<ForecastProfile> {
    let mut means = Vec::new();
    let mut dispersion = None;
    for row in rdr.deserialize() {
        let row: ForecastRow = row?;
        if means.is_empty() {
            dispersion = row.stdev;
        }
        means.push(row.forecast);
    }
    let dispersion = dispersion
        .ok_or_else(|| PlannerError::forecast("first row has no stdev (dispersion) value"))?;
    ForecastProfile::new(means, dispersion)
}
