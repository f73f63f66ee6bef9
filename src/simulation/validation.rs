// src/simulation/validation.rs

use crate::simulation::config::DAYS_PER_YEAR;
use crate::simulation::monte_carlo::{MonteCarloEvaluator, PolicySummary};
use crate::simulation::seeding::{Phase, StreamKey};
use crate::strategy::policy::Policy;
use serde::Serialize;
use tracing::info;

/// Baseline vs. best on trajectories neither phase has seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub baseline: PolicySummary,
    pub best: PolicySummary,
    pub stream: StreamKey,

    /// Positive when the best policy is cheaper.
    pub savings_per_day: f64,
    pub savings_per_year: f64,
    /// savings / baseline cost, in percent. Zero when the baseline costs nothing.
    pub savings_pct: f64,
    pub holding_savings_per_day: f64,
    pub ordering_savings_per_day: f64,

    /// best - baseline.
    pub service_delta: f64,
    /// best - baseline.
    pub orders_per_year_delta: f64,
    pub best_meets_target: bool,
}

/// Re-evaluates two policies on one fresh stream of the validation phase.
///
/// Both policies see the same validation trajectories so the comparison is paired,
/// and the stream is keyed by its own phase and seed so it never overlaps the grid.
pub fn validate(
    evaluator: &MonteCarloEvaluator<'_>,
    baseline: &Policy,
    best: &Policy,
    runs: usize,
    master_seed: u64,
) -> ValidationReport {
    let stream = StreamKey::new(Phase::Validation, master_seed, 0);
    info!(runs, baseline = %baseline, best = %best, "validating on fresh trajectories");

    let base = evaluator.evaluate(baseline, runs, stream);
    let cand = evaluator.evaluate(best, runs, stream);
    let report = compare(base, cand, stream, evaluator.service_target());

    info!(
        savings_per_day = report.savings_per_day,
        savings_pct = report.savings_pct,
        best_meets_target = report.best_meets_target,
        "validation complete"
    );
    report
}

fn compare(
    baseline: PolicySummary,
    best: PolicySummary,
    stream: StreamKey,
    service_target: f64,
) -> ValidationReport {
    let savings_per_day = baseline.mean_cost_per_day - best.mean_cost_per_day;
    let savings_pct = if baseline.mean_cost_per_day > 0.0 {
        100.0 * savings_per_day / baseline.mean_cost_per_day
    } else {
        0.0
    };
    ValidationReport {
        savings_per_day,
        savings_per_year: savings_per_day * DAYS_PER_YEAR,
        savings_pct,
        holding_savings_per_day: baseline.mean_holding_cost_per_day
            - best.mean_holding_cost_per_day,
        ordering_savings_per_day: baseline.mean_ordering_cost_per_day
            - best.mean_ordering_cost_per_day,
        service_delta: best.service_level - baseline.service_level,
        orders_per_year_delta: best.orders_per_year - baseline.orders_per_year,
        best_meets_target: best.service_level >= service_target,
        stream,
        baseline,
        best,
    }
}
