// src/simulation/experiment.rs

use crate::error::PlannerResult;
use crate::io::demand::{DemandModel, ForecastProfile};
use crate::simulation::config::{BaselinePolicy, ExperimentConfig};
use crate::simulation::monte_carlo::{MonteCarloEvaluator, PolicySummary};
use crate::simulation::seeding::{Phase, StreamKey};
use crate::simulation::validation::{validate, ValidationReport};
use crate::strategy::baseline::{derive_baseline, inverse_normal_cdf, BaselineDerivation};
use crate::strategy::grid_search::{CandidateResult, GridBounds, GridResult, GridSearch};
use crate::strategy::policy::Policy;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Everything an experiment produces, as plain records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub config: ExperimentConfig,
    pub baseline_policy: Policy,
    /// Present when the baseline was derived from the forecast.
    pub baseline_derivation: Option<BaselineDerivation>,
    pub baseline: PolicySummary,
    pub grid: GridResult,
    pub top_feasible: Vec<CandidateResult>,
    /// Present only when the grid found a feasible policy.
    pub validation: Option<ValidationReport>,
}

impl ExperimentReport {
    pub fn best_policy(&self) -> Option<Policy> {
        self.grid.best().map(|c| c.policy)
    }
}

/// Baseline characterisation, grid search and validation over one forecast.
#[derive(Debug)]
pub struct Experiment {
    config: ExperimentConfig,
    model: DemandModel,
    baseline_policy: Policy,
    baseline_derivation: Option<BaselineDerivation>,
    bounds: GridBounds,
}

impl Experiment {
    /// Validates the configuration, binds the forecast to the horizon, resolves the
    /// baseline and checks the grid around it. Nothing is simulated until `run`.
    pub fn new(config: ExperimentConfig, profile: ForecastProfile) -> PlannerResult<Self> {
        config.validate()?;
        let model = DemandModel::new(profile, config.horizon_days, config.round_demand_to_units)?;
        let (baseline_policy, baseline_derivation) = resolve_baseline(&config, &model)?;
        let bounds = GridBounds::around(&baseline_policy, &config.grid)?;
        Ok(Self {
            config,
            model,
            baseline_policy,
            baseline_derivation,
            bounds,
        })
    }

    pub fn baseline_policy(&self) -> Policy {
        self.baseline_policy
    }

    pub fn baseline_derivation(&self) -> Option<&BaselineDerivation> {
        self.baseline_derivation.as_ref()
    }

    /// The stream keys each phase draws from. Grid keys are listed for candidate 0.
    pub fn phase_streams(&self) -> [StreamKey; 3] {
        let seeds = self.config.seeds;
        [
            StreamKey::new(Phase::Baseline, seeds.baseline, 0),
            StreamKey::new(Phase::Grid, seeds.grid, 0),
            StreamKey::new(Phase::Validation, seeds.validation, 0),
        ]
    }

    pub fn run(&self) -> PlannerResult<ExperimentReport> {
        let start = Instant::now();
        let config = &self.config;
        let baseline_policy = self.baseline_policy;
        let evaluator =
            MonteCarloEvaluator::new(&self.model, config.inventory_params(), config.service_target);

        // 1. BASELINE
        info!(policy = %baseline_policy, runs = config.baseline_runs, "characterising baseline");
        let [baseline_stream, _, _] = self.phase_streams();
        let baseline = evaluator.evaluate(&baseline_policy, config.baseline_runs, baseline_stream);
        info!(
            cost_per_day = baseline.mean_cost_per_day,
            service = baseline.service_level,
            orders_per_year = baseline.orders_per_year,
            "baseline summary"
        );

        // 2. GRID SEARCH
        let search = GridSearch::new(&evaluator, &config.grid, config.seeds.grid);
        let grid = search.run(self.bounds)?;
        let top_feasible = grid.top_feasible(config.grid.top_k);

        // 3. VALIDATION
        let validation = grid.best().map(|best| {
            validate(
                &evaluator,
                &baseline_policy,
                &best.policy,
                config.validation_runs,
                config.seeds.validation,
            )
        });

        info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            feasible = grid.is_feasible(),
            "experiment finished"
        );

        Ok(ExperimentReport {
            config: config.clone(),
            baseline_policy,
            baseline_derivation: self.baseline_derivation.clone(),
            baseline,
            grid,
            top_feasible,
            validation,
        })
    }
}

/// Fixed baselines are taken as given; derived ones come from the forecast, with z
/// defaulting to the quantile of the service target.
fn resolve_baseline(
    config: &ExperimentConfig,
    model: &DemandModel,
) -> PlannerResult<(Policy, Option<BaselineDerivation>)> {
    match config.baseline {
        BaselinePolicy::Fixed {
            reorder_point,
            order_quantity,
        } => Ok((Policy::new(reorder_point, order_quantity)?, None)),
        BaselinePolicy::Derived { service_z } => {
            let z = service_z.unwrap_or_else(|| inverse_normal_cdf(config.service_target));
            let derivation = derive_baseline(
                model.profile(),
                config.lead_time_days as usize,
                z,
                config.holding_cost,
                config.order_cost,
            )?;
            Ok((derivation.policy, Some(derivation)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use std::collections::HashSet;

    fn small_config() -> ExperimentConfig {
        let mut c = ExperimentConfig::reference();
        c.horizon_days = 40;
        c.baseline_runs = 200;
        c.validation_runs = 200;
        c.grid.reorder_point_span = 4;
        c.grid.order_quantity_span = 2;
        c.grid.runs_per_candidate = 50;
        c
    }

    #[test]
    fn rejects_configuration_before_simulating() {
        let mut c = small_config();
        c.order_cost = -5.0;
        let profile = ForecastProfile::constant(40, 17.64, 0.1).unwrap();
        assert!(matches!(
            Experiment::new(c, profile),
            Err(PlannerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_forecast_of_the_wrong_length() {
        let profile = ForecastProfile::constant(39, 17.64, 0.1).unwrap();
        assert!(matches!(
            Experiment::new(small_config(), profile),
            Err(PlannerError::InvalidForecast(_))
        ));
    }

    #[test]
    fn phases_never_share_a_stream() {
        let profile = ForecastProfile::constant(40, 17.64, 0.1).unwrap();
        let experiment = Experiment::new(small_config(), profile).unwrap();
        let streams = experiment.phase_streams();
        let unique: HashSet<StreamKey> = streams.iter().copied().collect();
        assert_eq!(unique.len(), 3);

        // No run seed of the validation stream appears in the grid stream.
        let grid: HashSet<u64> = (0..1_000).map(|i| streams[1].run_seed(i)).collect();
        assert!((0..1_000).all(|i| !grid.contains(&streams[2].run_seed(i))));
    }

    #[test]
    fn derived_baseline_uses_service_target_when_z_missing() {
        let mut c = small_config();
        c.baseline = BaselinePolicy::Derived { service_z: None };
        let profile = ForecastProfile::constant(40, 17.64, 0.1).unwrap();
        let experiment = Experiment::new(c, profile).unwrap();
        let policy = experiment.baseline_policy();
        let derivation = experiment.baseline_derivation().unwrap();
        assert!((derivation.service_z - 1.645).abs() < 1e-3);
        assert_eq!(policy, derivation.policy);
        assert_eq!(policy.order_quantity(), 42);
    }

    #[test]
    fn grid_reaching_below_zero_is_rejected_by_new() {
        let mut c = small_config();
        c.baseline = BaselinePolicy::Fixed {
            reorder_point: 5,
            order_quantity: 42,
        };
        c.grid.reorder_point_span = 10;
        c.baseline_runs = 200_000;
        let profile = ForecastProfile::constant(40, 17.64, 0.1).unwrap();
        assert!(matches!(
            Experiment::new(c, profile),
            Err(PlannerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn oversized_grid_is_rejected_by_new() {
        let mut c = small_config();
        c.grid.max_candidates = 24;
        let profile = ForecastProfile::constant(40, 17.64, 0.1).unwrap();
        assert!(matches!(
            Experiment::new(c.clone(), profile.clone()),
            Err(PlannerError::InvalidConfiguration(_))
        ));
        c.grid.max_candidates = 25;
        assert!(Experiment::new(c, profile).is_ok());
    }

    #[test]
    fn invalid_fixed_baseline_is_rejected_by_new() {
        let mut c = small_config();
        c.baseline = BaselinePolicy::Fixed {
            reorder_point: 92,
            order_quantity: 0,
        };
        let profile = ForecastProfile::constant(40, 17.64, 0.1).unwrap();
        assert!(matches!(
            Experiment::new(c, profile),
            Err(PlannerError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn full_run_is_reproducible() {
        let profile = ForecastProfile::constant(40, 17.64, 0.1).unwrap();
        let experiment = Experiment::new(small_config(), profile).unwrap();
        let a = experiment.run().unwrap();
        let b = experiment.run().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.baseline.runs, 200);
        assert_eq!(a.grid.candidates.len(), 5 * 5);
        if let Some(v) = &a.validation {
            assert_eq!(v.baseline.runs, 200);
            assert_eq!(Some(v.best.policy), a.best_policy());
        }
    }
}
