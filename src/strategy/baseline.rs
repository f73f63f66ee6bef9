// src/strategy/baseline.rs

//! Classical starting point for the search: safety stock over lead-time demand
//! for the reorder point, and the Economic Order Quantity for the batch size.

use crate::error::{PlannerError, PlannerResult};
use crate::io::demand::ForecastProfile;
use crate::strategy::policy::Policy;
use serde::Serialize;

/// Approximate Inverse Cumulative Distribution Function (Quantile function) for Standard Normal Distribution.
///
/// Based on Abramowitz and Stegun formula 26.2.23.
/// The absolute error is less than 4.5e-4.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p >= 1.0 {
        return 5.0;
    } // Cap at reasonable sigma
    if p <= 0.0 {
        return -5.0;
    }
    if p == 0.5 {
        return 0.0;
    }

    // Formula is valid for 0 < p <= 0.5
    // If p > 0.5, we use 1-p and negate the result
    let q = if p < 0.5 { p } else { 1.0 - p };

    let t = (-2.0 * q.ln()).sqrt();

    let c0 = 2.515517;
    let c1 = 0.802853;
    let c2 = 0.010328;

    let d1 = 1.432788;
    let d2 = 0.189269;
    let d3 = 0.001308;

    let numerator = c0 + c1 * t + c2 * t * t;
    let denominator = 1.0 + d1 * t + d2 * t * t + d3 * t * t * t;

    let x = t - (numerator / denominator);

    if p < 0.5 {
        -x
    } else {
        x
    }
}

/// The intermediate numbers behind a derived baseline, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineDerivation {
    pub service_z: f64,
    pub lead_time_expected_demand: f64,
    pub lead_time_demand_std_dev: f64,
    pub safety_stock: i64,
    pub average_daily_demand: f64,
    pub policy: Policy,
}

/// Economic Order Quantity: sqrt(2 * order_cost * daily_demand / holding_cost), at least 1.
pub fn economic_order_quantity(order_cost: f64, daily_demand: f64, holding_cost: f64) -> PlannerResult<i64> {
    if !(holding_cost > 0.0) {
        return Err(PlannerError::config(
            "EOQ needs a holding cost above zero",
        ));
    }
    let eoq = ((2.0 * order_cost * daily_demand) / holding_cost).sqrt();
    if !eoq.is_finite() {
        return Err(PlannerError::config("EOQ is not finite"));
    }
    Ok((eoq.round() as i64).max(1))
}

/// Derives (R0, Q0) from the forecast.
///
/// # Formula
/// Lead-time window = the first `lead_time_days` of the forecast.
///
/// Safety Stock = round(Z * sigma_log * sqrt(sum(mu_t^2)))   (proportional normal errors)
/// R0 = round(sum(mu_t) + Safety Stock)
/// Q0 = EOQ over the profile's average daily demand
pub fn derive_baseline(
    profile: &ForecastProfile,
    lead_time_days: usize,
    service_z: f64,
    holding_cost: f64,
    order_cost: f64,
) -> PlannerResult<BaselineDerivation> {
    let window = &profile.means()[..lead_time_days.min(profile.horizon())];
    let expected: f64 = window.iter().sum();
    let variance = profile.dispersion().powi(2) * window.iter().map(|m| m * m).sum::<f64>();
    let std_dev = variance.sqrt();

    let safety_stock = (service_z * std_dev).round() as i64;
    let reorder_point = (expected + safety_stock as f64).round() as i64;
    let average = profile.average_demand();
    let order_quantity = economic_order_quantity(order_cost, average, holding_cost)?;

    Ok(BaselineDerivation {
        service_z,
        lead_time_expected_demand: expected,
        lead_time_demand_std_dev: std_dev,
        safety_stock,
        average_daily_demand: average,
        policy: Policy::new(reorder_point.max(0), order_quantity)?,
    })
}
