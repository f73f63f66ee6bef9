// src/strategy/grid_search.rs

use crate::error::{PlannerError, PlannerResult};
use crate::simulation::config::GridSpec;
use crate::simulation::monte_carlo::{MonteCarloEvaluator, PolicySummary};
use crate::simulation::seeding::{Phase, StreamKey};
use crate::strategy::policy::Policy;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tracing::info;

/// Inclusive bounds of the searched neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridBounds {
    pub reorder_point_min: u32,
    pub reorder_point_max: u32,
    pub reorder_point_step: u32,
    pub order_quantity_min: u32,
    pub order_quantity_max: u32,
    pub order_quantity_step: u32,
}

impl GridBounds {
    /// Centres the grid on `baseline`. Ranges reaching R < 0 or Q < 1 are rejected
    /// rather than clipped, so the grid stays centred. Grids larger than
    /// `max_candidates` are rejected as well.
    pub fn around(baseline: &Policy, grid: &GridSpec) -> PlannerResult<Self> {
        let r0 = baseline.reorder_point();
        let q0 = baseline.order_quantity();
        let reorder_point_min = r0.checked_sub(grid.reorder_point_span).ok_or_else(|| {
            PlannerError::config(format!(
                "reorder point span {} reaches below zero from R0={}",
                grid.reorder_point_span, r0
            ))
        })?;
        let order_quantity_min = q0
            .checked_sub(grid.order_quantity_span)
            .filter(|q| *q >= 1)
            .ok_or_else(|| {
                PlannerError::config(format!(
                    "order quantity span {} reaches below one from Q0={}",
                    grid.order_quantity_span, q0
                ))
            })?;
        let overflow = || PlannerError::config("grid range overflows");
        let bounds = Self {
            reorder_point_min,
            reorder_point_max: r0.checked_add(grid.reorder_point_span).ok_or_else(overflow)?,
            reorder_point_step: grid.reorder_point_step,
            order_quantity_min,
            order_quantity_max: q0.checked_add(grid.order_quantity_span).ok_or_else(overflow)?,
            order_quantity_step: grid.order_quantity_step,
        };
        let size = bounds.size();
        if size > grid.max_candidates {
            return Err(PlannerError::config(format!(
                "grid has {} candidates, limit is {}",
                size, grid.max_candidates
            )));
        }
        Ok(bounds)
    }

    fn reorder_points(&self) -> impl Iterator<Item = u32> + '_ {
        (self.reorder_point_min..=self.reorder_point_max).step_by(self.reorder_point_step as usize)
    }

    fn order_quantities(&self) -> impl Iterator<Item = u32> + '_ {
        (self.order_quantity_min..=self.order_quantity_max)
            .step_by(self.order_quantity_step as usize)
    }

    /// Number of candidates the grid will evaluate.
    pub fn size(&self) -> usize {
        axis_len(self.reorder_point_min, self.reorder_point_max, self.reorder_point_step)
            .saturating_mul(axis_len(
                self.order_quantity_min,
                self.order_quantity_max,
                self.order_quantity_step,
            ))
    }

    pub fn contains(&self, policy: &Policy) -> bool {
        (self.reorder_point_min..=self.reorder_point_max).contains(&policy.reorder_point())
            && (self.order_quantity_min..=self.order_quantity_max)
                .contains(&policy.order_quantity())
    }

    /// Candidates in row-major order: R outer, Q inner.
    pub fn candidates(&self) -> PlannerResult<Vec<Policy>> {
        let mut out = Vec::with_capacity(self.size());
        for r in self.reorder_points() {
            for q in self.order_quantities() {
                out.push(Policy::new(i64::from(r), i64::from(q))?);
            }
        }
        Ok(out)
    }
}

/// Points in `min..=max` at `step`. Zero for an empty or stepless axis.
fn axis_len(min: u32, max: u32, step: u32) -> usize {
    if step == 0 || max < min {
        return 0;
    }
    ((max - min) / step) as usize + 1
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    pub policy: Policy,
    pub summary: PolicySummary,
    /// service >= target + margin.
    pub feasible: bool,
}

/// Feasible winner, or a clear statement that nothing met the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Feasible { best: CandidateResult },
    /// Best-first by service level, for diagnosis. None of these are feasible.
    Infeasible { closest: Vec<CandidateResult> },
}

/// Every evaluated candidate plus the selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridResult {
    pub bounds: GridBounds,
    pub runs_per_candidate: usize,
    pub service_target: f64,
    pub feasibility_margin: f64,
    pub candidates: Vec<CandidateResult>,
    pub outcome: SearchOutcome,
}

impl GridResult {
    pub fn best(&self) -> Option<&CandidateResult> {
        match &self.outcome {
            SearchOutcome::Feasible { best } => Some(best),
            SearchOutcome::Infeasible { .. } => None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.best().is_some()
    }

    /// The `k` cheapest feasible candidates, in selection order.
    pub fn top_feasible(&self, k: usize) -> Vec<CandidateResult> {
        let mut feasible: Vec<&CandidateResult> =
            self.candidates.iter().filter(|c| c.feasible).collect();
        feasible.sort_by(|a, b| selection_order(a, b));
        feasible.into_iter().take(k).cloned().collect()
    }
}

/// Cheapest first; ties go to the smaller footprint R+Q, then the smaller Q.
fn selection_order(a: &CandidateResult, b: &CandidateResult) -> Ordering {
    a.summary
        .mean_cost_per_day
        .total_cmp(&b.summary.mean_cost_per_day)
        .then_with(|| a.policy.footprint().cmp(&b.policy.footprint()))
        .then_with(|| a.policy.order_quantity().cmp(&b.policy.order_quantity()))
}

/// Highest service first; ties go to the cheaper candidate.
fn closeness_order(a: &CandidateResult, b: &CandidateResult) -> Ordering {
    b.summary
        .service_level
        .total_cmp(&a.summary.service_level)
        .then_with(|| selection_order(a, b))
}

/// Picks the winner among evaluated candidates.
pub fn select(candidates: &[CandidateResult], top_k: usize) -> SearchOutcome {
    match candidates
        .iter()
        .filter(|c| c.feasible)
        .min_by(|a, b| selection_order(a, b))
    {
        Some(best) => SearchOutcome::Feasible { best: best.clone() },
        None => {
            let mut closest: Vec<&CandidateResult> = candidates.iter().collect();
            closest.sort_by(|a, b| closeness_order(a, b));
            SearchOutcome::Infeasible {
                closest: closest.into_iter().take(top_k).cloned().collect(),
            }
        }
    }
}

/// Exhaustive constrained search over an (R, Q) neighbourhood.
#[derive(Debug)]
pub struct GridSearch<'a> {
    evaluator: &'a MonteCarloEvaluator<'a>,
    grid: &'a GridSpec,
    master_seed: u64,
}

impl<'a> GridSearch<'a> {
    pub fn new(evaluator: &'a MonteCarloEvaluator<'a>, grid: &'a GridSpec, master_seed: u64) -> Self {
        Self {
            evaluator,
            grid,
            master_seed,
        }
    }

    /// Stream used for candidate `index`. With common random numbers every candidate
    /// shares stream 0.
    pub fn stream_for(&self, index: usize) -> StreamKey {
        let stream = if self.grid.common_random_numbers {
            0
        } else {
            index as u64
        };
        StreamKey::new(Phase::Grid, self.master_seed, stream)
    }

    /// Evaluates every point of `bounds`, which `GridBounds::around` has already
    /// checked against the configured limits.
    pub fn run(&self, bounds: GridBounds) -> PlannerResult<GridResult> {
        let size = bounds.size();
        let policies = bounds.candidates()?;
        let runs = self.grid.runs_per_candidate;
        let threshold = self.evaluator.service_target() + self.grid.feasibility_margin;

        info!(
            candidates = size,
            runs_per_candidate = runs,
            simulations = size * runs,
            r_range = ?(bounds.reorder_point_min, bounds.reorder_point_max),
            q_range = ?(bounds.order_quantity_min, bounds.order_quantity_max),
            "starting grid search"
        );

        let done = AtomicUsize::new(0);
        let tick = (size / 10).max(1);
        let candidates: Vec<CandidateResult> = policies
            .par_iter()
            .enumerate()
            .map(|(i, policy)| {
                let summary = self.evaluator.evaluate(policy, runs, self.stream_for(i));
                let finished = done.fetch_add(1, AtomicOrdering::Relaxed) + 1;
                if finished % tick == 0 || finished == size {
                    info!(finished, total = size, "grid search progress");
                }
                CandidateResult {
                    policy: *policy,
                    feasible: summary.service_level >= threshold,
                    summary,
                }
            })
            .collect();

        let outcome = select(&candidates, self.grid.top_k);
        match &outcome {
            SearchOutcome::Feasible { best } => info!(
                best = %best.policy,
                cost_per_day = best.summary.mean_cost_per_day,
                service = best.summary.service_level,
                "grid search found a feasible policy"
            ),
            SearchOutcome::Infeasible { closest } => info!(
                closest = ?closest.first().map(|c| c.policy.to_string()),
                threshold,
                "no candidate met the service target"
            ),
        }

        Ok(GridResult {
            bounds,
            runs_per_candidate: runs,
            service_target: self.evaluator.service_target(),
            feasibility_margin: self.grid.feasibility_margin,
            candidates,
            outcome,
        })
    }
}
