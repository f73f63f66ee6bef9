// src/io/demand.rs

use crate::error::{PlannerError, PlannerResult};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// Daily mean demand plus the relative forecast error supplied by the upstream forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct ForecastProfile {
    means: Vec<f64>,
    dispersion: f64,
}

/// Unchecked wire form; deserialising a profile goes through `ForecastProfile::new`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    means: Vec<f64>,
    dispersion: f64,
}

impl TryFrom<RawProfile> for ForecastProfile {
    type Error = PlannerError;

    fn try_from(raw: RawProfile) -> PlannerResult<Self> {
        Self::new(raw.means, raw.dispersion)
    }
}

impl ForecastProfile {
    /// Validates and wraps a forecast.
    ///
    /// # Arguments
    /// * `means` - Mean demand per day (mu_t), finite and non-negative.
    /// * `dispersion` - Relative residual standard deviation (sigma_log), finite and non-negative.
    pub fn new(means: Vec<f64>, dispersion: f64) -> PlannerResult<Self> {
        if means.is_empty() {
            return Err(PlannerError::forecast("forecast has no days"));
        }
        if let Some((day, mean)) = means
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(PlannerError::forecast(format!(
                "mean demand on day {} is {} (must be finite and >= 0)",
                day, mean
            )));
        }
        if !dispersion.is_finite() || dispersion < 0.0 {
            return Err(PlannerError::forecast(format!(
                "dispersion {} must be finite and >= 0",
                dispersion
            )));
        }
        Ok(Self { means, dispersion })
    }

    /// A flat forecast: every day has the same mean.
    /// Useful for sanity scenarios and tests.
    pub fn constant(days: usize, mean: f64, dispersion: f64) -> PlannerResult<Self> {
        Self::new(vec![mean; days], dispersion)
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn dispersion(&self) -> f64 {
        self.dispersion
    }

    pub fn horizon(&self) -> usize {
        self.means.len()
    }

    /// Average daily mean over the whole profile.
    pub fn average_demand(&self) -> f64 {
        self.means.iter().sum::<f64>() / self.means.len() as f64
    }
}

/// One realised demand path. Values are non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandTrajectory(Vec<f64>);

impl DemandTrajectory {
    /// Wraps a hand-written path, clipping anything negative or non-finite to zero.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(
            values
                .into_iter()
                .map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
                .collect(),
        )
    }

    pub fn days(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Draws demand paths around a forecast: Normal(mu_t, sigma_log * mu_t), clipped at zero.
///
/// The model holds no random state; every call takes the generator it should consume.
#[derive(Debug, Clone)]
pub struct DemandModel {
    profile: ForecastProfile,
    round_to_units: bool,
}

impl DemandModel {
    /// Binds a profile to a horizon. The profile must cover exactly `horizon` days.
    pub fn new(profile: ForecastProfile, horizon: usize, round_to_units: bool) -> PlannerResult<Self> {
        if profile.horizon() != horizon {
            return Err(PlannerError::forecast(format!(
                "forecast covers {} days but the horizon is {} days",
                profile.horizon(),
                horizon
            )));
        }
        Ok(Self {
            profile,
            round_to_units,
        })
    }

    pub fn profile(&self) -> &ForecastProfile {
        &self.profile
    }

    pub fn horizon(&self) -> usize {
        self.profile.horizon()
    }

    /// Samples one trajectory.
    ///
    /// Every day consumes exactly one standard normal draw, so two models fed the
    /// same generator stay aligned day by day.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DemandTrajectory {
        let sigma_log = self.profile.dispersion;
        let mut days = Vec::with_capacity(self.profile.means.len());
        for &mean in &self.profile.means {
            let z: f64 = StandardNormal.sample(&mut *rng);
            if mean == 0.0 {
                days.push(0.0);
                continue;
            }
            // Demand cannot be negative.
            let draw = (mean + sigma_log * mean * z).max(0.0);
            days.push(if self.round_to_units { draw.round() } else { draw });
        }
        DemandTrajectory(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rejects_bad_profiles() {
        assert!(ForecastProfile::new(vec![], 0.1).is_err());
        assert!(ForecastProfile::new(vec![1.0, -2.0], 0.1).is_err());
        assert!(ForecastProfile::new(vec![1.0, f64::NAN], 0.1).is_err());
        assert!(ForecastProfile::new(vec![1.0, f64::INFINITY], 0.1).is_err());
        assert!(ForecastProfile::new(vec![1.0], -0.1).is_err());
        assert!(ForecastProfile::new(vec![1.0], f64::NAN).is_err());
    }

    #[test]
    fn deserialising_applies_the_same_checks() {
        let bad = serde_json::from_str::<ForecastProfile>(
            r#"{"means":[-5.0,3.0],"dispersion":-2.0}"#,
        );
        assert!(bad.is_err());
        let bad_dispersion =
            serde_json::from_str::<ForecastProfile>(r#"{"means":[5.0],"dispersion":-0.1}"#);
        assert!(bad_dispersion.is_err());
        assert!(serde_json::from_str::<ForecastProfile>(r#"{"means":[],"dispersion":0.1}"#).is_err());

        let good: ForecastProfile =
            serde_json::from_str(r#"{"means":[5.0,0.0],"dispersion":0.2}"#).unwrap();
        assert_eq!(good, ForecastProfile::new(vec![5.0, 0.0], 0.2).unwrap());
        let back: ForecastProfile =
            serde_json::from_str(&serde_json::to_string(&good).unwrap()).unwrap();
        assert_eq!(back, good);
    }

    #[test]
    fn rejects_horizon_mismatch() {
        let profile = ForecastProfile::constant(90, 10.0, 0.1).unwrap();
        let err = DemandModel::new(profile, 91, false).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidForecast(_)));
    }

    #[test]
    fn zero_mean_days_draw_exactly_zero() {
        let profile = ForecastProfile::new(vec![0.0, 25.0, 0.0, 40.0, 0.0], 0.8).unwrap();
        let model = DemandModel::new(profile, 5, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let path = model.sample(&mut rng);
            assert_eq!(path.days()[0], 0.0);
            assert_eq!(path.days()[2], 0.0);
            assert_eq!(path.days()[4], 0.0);
        }
    }

    #[test]
    fn zero_dispersion_reproduces_the_forecast() {
        let means = vec![3.5, 0.0, 12.25, 7.0];
        let profile = ForecastProfile::new(means.clone(), 0.0).unwrap();
        let model = DemandModel::new(profile, 4, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(model.sample(&mut rng).days(), means.as_slice());
    }

    #[test]
    fn same_seed_same_path() {
        let profile = ForecastProfile::constant(91, 17.64, 0.1).unwrap();
        let model = DemandModel::new(profile, 91, false).unwrap();
        let a = model.sample(&mut ChaCha8Rng::seed_from_u64(99));
        let b = model.sample(&mut ChaCha8Rng::seed_from_u64(99));
        let c = model.sample(&mut ChaCha8Rng::seed_from_u64(100));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rounding_yields_whole_units() {
        let profile = ForecastProfile::constant(200, 9.3, 0.4).unwrap();
        let model = DemandModel::new(profile, 200, true).unwrap();
        let path = model.sample(&mut ChaCha8Rng::seed_from_u64(5));
        assert!(path.days().iter().all(|d| d.fract() == 0.0 && *d >= 0.0));
    }

    #[test]
    fn sample_mean_tracks_the_forecast() {
        let profile = ForecastProfile::constant(91, 50.0, 0.1).unwrap();
        let model = DemandModel::new(profile, 91, false).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let total: f64 = (0..200).map(|_| model.sample(&mut rng).total()).sum();
        let per_day = total / (200.0 * 91.0);
        assert!((per_day - 50.0).abs() < 0.5, "per-day mean {}", per_day);
    }

    #[test]
    fn hand_written_paths_are_clipped() {
        let path = DemandTrajectory::from_values(vec![4.0, -1.0, f64::NAN, 2.5]);
        assert_eq!(path.days(), &[4.0, 0.0, 0.0, 2.5]);
        assert_eq!(path.total(), 6.5);
    }
}
