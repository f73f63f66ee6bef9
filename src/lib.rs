//! Service-constrained (R, Q) replenishment planning for a single SKU.
//!
//! Demand paths are drawn around a forecast, each candidate policy is simulated
//! day by day under lost sales, a grid around the baseline is searched for the
//! cheapest policy meeting the fill-rate target, and the winner is re-checked on
//! fresh trajectories.

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use crate::error::{PlannerError, PlannerResult};
pub use crate::io::demand::{DemandModel, DemandTrajectory, ForecastProfile};
pub use crate::simulation::config::{BaselinePolicy, ExperimentConfig, GridSpec, PhaseSeeds};
pub use crate::simulation::experiment::{Experiment, ExperimentReport};
pub use crate::simulation::monte_carlo::{MonteCarloEvaluator, PolicySummary};
pub use crate::strategy::grid_search::{GridResult, SearchOutcome};
pub use crate::strategy::policy::Policy;
