// src/io/reporting.rs

use crate::error::PlannerResult;
use crate::simulation::experiment::ExperimentReport;
use crate::strategy::grid_search::GridResult;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// One line of the grid table.
#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub reorder_point: u32,
    pub order_quantity: u32,
    pub runs: usize,
    pub service_level: f64,
    pub holding_cost_per_day: f64,
    pub ordering_cost_per_day: f64,
    pub total_cost_per_day: f64,
    pub cost_p95: f64,
    pub orders_per_year: f64,
    pub feasible: bool,
}

impl GridRow {
    pub fn rows(grid: &GridResult) -> Vec<GridRow> {
        grid.candidates
            .iter()
            .map(|c| GridRow {
                reorder_point: c.policy.reorder_point(),
                order_quantity: c.policy.order_quantity(),
                runs: c.summary.runs,
                service_level: c.summary.service_level,
                holding_cost_per_day: c.summary.mean_holding_cost_per_day,
                ordering_cost_per_day: c.summary.mean_ordering_cost_per_day,
                total_cost_per_day: c.summary.mean_cost_per_day,
                cost_p95: c.summary.cost_p95,
                orders_per_year: c.summary.orders_per_year,
                feasible: c.feasible,
            })
            .collect()
    }
}

/// Writes every grid candidate to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "out/grid.csv").
/// * `grid` - The grid search result.
pub fn write_grid_csv(file_path: &Path, grid: &GridResult) -> PlannerResult<()> {
    let rows = GridRow::rows(grid);
    let mut wtr = csv::Writer::from_path(file_path)?;
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    info!(rows = rows.len(), path = %file_path.display(), "wrote grid table");
    Ok(())
}

/// Writes the whole report as pretty JSON.
pub fn write_report_json(file_path: &Path, report: &ExperimentReport) -> PlannerResult<()> {
    fs::write(file_path, serde_json::to_string_pretty(report)?)?;
    info!(path = %file_path.display(), "wrote experiment report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::demand::ForecastProfile;
    use crate::simulation::config::ExperimentConfig;
    use crate::simulation::experiment::Experiment;
    use std::path::PathBuf;

    fn tiny_report() -> ExperimentReport {
        let mut c = ExperimentConfig::reference();
        c.horizon_days = 20;
        c.baseline_runs = 20;
        c.validation_runs = 20;
        c.grid.reorder_point_span = 2;
        c.grid.order_quantity_span = 1;
        c.grid.runs_per_candidate = 10;
        let profile = ForecastProfile::constant(20, 17.64, 0.1).unwrap();
        Experiment::new(c, profile).unwrap().run().unwrap()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("replenish-{}-{}", std::process::id(), name))
    }

    #[test]
    fn grid_csv_has_one_row_per_candidate() {
        let report = tiny_report();
        let path = temp_path("grid.csv");
        write_grid_csv(&path, &report.grid).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[0], "reorder_point");
        assert_eq!(&headers[9], "feasible");
        assert_eq!(rdr.records().count(), report.grid.candidates.len());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn report_json_is_structured() {
        let report = tiny_report();
        let path = temp_path("report.json");
        write_report_json(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["baseline"]["runs"], 20);
        assert_eq!(value["config"]["horizon_days"], 20);
        assert!(value["grid"]["outcome"]["status"].is_string());
        fs::remove_file(&path).unwrap();
    }
}
