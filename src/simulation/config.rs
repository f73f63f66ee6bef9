// src/simulation/config.rs

use crate::error::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Days per year used to annualise order counts and savings.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Everything one experiment needs. Immutable once validated and passed by reference
/// into every phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    pub horizon_days: usize,
    pub lead_time_days: u32,
    /// Minimum acceptable fill rate, strictly between 0 and 1.
    pub service_target: f64,
    /// $ per unit on hand per day.
    pub holding_cost: f64,
    /// $ per order placed.
    pub order_cost: f64,
    pub round_demand_to_units: bool,
    pub baseline: BaselinePolicy,
    pub grid: GridSpec,
    pub baseline_runs: usize,
    pub validation_runs: usize,
    pub seeds: PhaseSeeds,
}

/// Where the baseline (R0, Q0) comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Use the given policy as is.
    Fixed { reorder_point: i64, order_quantity: i64 },
    /// Safety stock + EOQ from the forecast. Without `service_z` the Z-score is
    /// derived from the service target.
    Derived { service_z: Option<f64> },
}

/// Neighbourhood searched around the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSpec {
    /// R ranges over [R0 - span, R0 + span].
    pub reorder_point_span: u32,
    pub reorder_point_step: u32,
    /// Q ranges over [Q0 - span, Q0 + span].
    pub order_quantity_span: u32,
    pub order_quantity_step: u32,
    /// Monte Carlo runs per candidate. May be smaller than the baseline/validation count.
    pub runs_per_candidate: usize,
    /// Extra service a candidate must show in the grid to count as feasible.
    pub feasibility_margin: f64,
    /// Evaluate every candidate on the same trajectory set.
    pub common_random_numbers: bool,
    /// Upper bound on the number of candidates; larger grids are rejected.
    pub max_candidates: usize,
    /// Length of the top-K feasible list and of the closest-to-feasible list.
    pub top_k: usize,
}

/// One master seed per phase. They must all differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseSeeds {
    pub baseline: u64,
    pub grid: u64,
    pub validation: u64,
}

/// The cost and timing parameters the policy simulator needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryParams {
    pub lead_time_days: usize,
    pub holding_cost: f64,
    pub order_cost: f64,
}

impl InventoryParams {
    pub fn new(lead_time_days: usize, holding_cost: f64, order_cost: f64) -> PlannerResult<Self> {
        check_cost("holding_cost", holding_cost)?;
        check_cost("order_cost", order_cost)?;
        Ok(Self {
            lead_time_days,
            holding_cost,
            order_cost,
        })
    }
}

impl ExperimentConfig {
    /// The single-SKU scenario from the original analysis: 91-day horizon, 5-day lead
    /// time, 95% fill-rate target, $1/unit/day holding, $50/order, baseline R=92 Q=42.
    pub fn reference() -> Self {
        Self {
            horizon_days: 91,
            lead_time_days: 5,
            service_target: 0.95,
            holding_cost: 1.0,
            order_cost: 50.0,
            round_demand_to_units: true,
            baseline: BaselinePolicy::Fixed {
                reorder_point: 92,
                order_quantity: 42,
            },
            grid: GridSpec {
                reorder_point_span: 10,
                reorder_point_step: 2,
                order_quantity_span: 10,
                order_quantity_step: 1,
                runs_per_candidate: 1_000,
                feasibility_margin: 0.0,
                common_random_numbers: true,
                max_candidates: 10_000,
                top_k: 10,
            },
            baseline_runs: 10_000,
            validation_runs: 10_000,
            seeds: PhaseSeeds {
                baseline: 42,
                grid: 0,
                validation: 123,
            },
        }
    }

    /// Loads a JSON config file and validates it.
    pub fn from_json_file(path: &Path) -> PlannerResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects anything that would make the simulation meaningless. Runs before any
    /// trajectory is drawn.
    pub fn validate(&self) -> PlannerResult<()> {
        if self.horizon_days == 0 {
            return Err(PlannerError::config("horizon_days must be >= 1"));
        }
        if !(self.service_target > 0.0 && self.service_target < 1.0) {
            return Err(PlannerError::config(format!(
                "service_target {} must lie in (0, 1)",
                self.service_target
            )));
        }
        check_cost("holding_cost", self.holding_cost)?;
        check_cost("order_cost", self.order_cost)?;
        if self.baseline_runs == 0 || self.validation_runs == 0 {
            return Err(PlannerError::config(
                "baseline_runs and validation_runs must be >= 1",
            ));
        }
        match self.baseline {
            BaselinePolicy::Fixed { .. } => {}
            BaselinePolicy::Derived { service_z } => {
                if let Some(z) = service_z {
                    if !z.is_finite() {
                        return Err(PlannerError::config("service_z must be finite"));
                    }
                }
                if self.holding_cost == 0.0 {
                    return Err(PlannerError::config(
                        "a derived baseline needs holding_cost > 0 (EOQ is undefined otherwise)",
                    ));
                }
            }
        }
        self.grid.validate()?;
        if self.service_target + self.grid.feasibility_margin >= 1.0 {
            return Err(PlannerError::config(format!(
                "service_target {} plus feasibility_margin {} leaves no reachable threshold",
                self.service_target, self.grid.feasibility_margin
            )));
        }
        self.seeds.validate()
    }

    pub fn inventory_params(&self) -> InventoryParams {
        InventoryParams {
            lead_time_days: self.lead_time_days as usize,
            holding_cost: self.holding_cost,
            order_cost: self.order_cost,
        }
    }

    /// Applies one `--key=value` command-line override.
    pub fn apply_override(&mut self, key: &str, val: &str) -> PlannerResult<()> {
        fn parse<T: std::str::FromStr>(key: &str, val: &str) -> PlannerResult<T> {
            val.parse()
                .map_err(|_| PlannerError::config(format!("cannot parse --{}={}", key, val)))
        }
        match key {
            "horizon_days" => self.horizon_days = parse(key, val)?,
            "lead_time_days" => self.lead_time_days = parse(key, val)?,
            "service_target" => self.service_target = parse(key, val)?,
            "holding_cost" => self.holding_cost = parse(key, val)?,
            "order_cost" => self.order_cost = parse(key, val)?,
            "round_demand_to_units" => self.round_demand_to_units = parse(key, val)?,
            "baseline_runs" => self.baseline_runs = parse(key, val)?,
            "validation_runs" => self.validation_runs = parse(key, val)?,
            "grid_runs" => self.grid.runs_per_candidate = parse(key, val)?,
            "feasibility_margin" => self.grid.feasibility_margin = parse(key, val)?,
            "common_random_numbers" => self.grid.common_random_numbers = parse(key, val)?,
            "top_k" => self.grid.top_k = parse(key, val)?,
            "baseline_seed" => self.seeds.baseline = parse(key, val)?,
            "grid_seed" => self.seeds.grid = parse(key, val)?,
            "validation_seed" => self.seeds.validation = parse(key, val)?,
            _ => {
                return Err(PlannerError::config(format!(
                    "unknown override --{}",
                    key
                )))
            }
        }
        Ok(())
    }
}

impl GridSpec {
    pub fn validate(&self) -> PlannerResult<()> {
        if self.reorder_point_step == 0 || self.order_quantity_step == 0 {
            return Err(PlannerError::config("grid steps must be >= 1"));
        }
        if self.runs_per_candidate == 0 {
            return Err(PlannerError::config("grid runs_per_candidate must be >= 1"));
        }
        if !(0.0..1.0).contains(&self.feasibility_margin) {
            return Err(PlannerError::config(format!(
                "feasibility_margin {} must lie in [0, 1)",
                self.feasibility_margin
            )));
        }
        if self.max_candidates == 0 || self.top_k == 0 {
            return Err(PlannerError::config(
                "grid max_candidates and top_k must be >= 1",
            ));
        }
        Ok(())
    }
}

impl PhaseSeeds {
    /// Reusing a seed across phases would let validation see grid-search trajectories.
    pub fn validate(&self) -> PlannerResult<()> {
        if self.baseline == self.grid
            || self.baseline == self.validation
            || self.grid == self.validation
        {
            return Err(PlannerError::config(format!(
                "phase seeds must be distinct (baseline={}, grid={}, validation={})",
                self.baseline, self.grid, self.validation
            )));
        }
        Ok(())
    }
}

fn check_cost(name: &str, value: f64) -> PlannerResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlannerError::config(format!(
            "{} {} must be finite and >= 0",
            name, value
        )));
    }
    Ok(())
}
