//! Closed-form and regression-based parameter estimation
//!
//! Each estimator is a pure function of the observations and the time step.
//! [`Calibrator`] bundles the step and CIR shift and dispatches on a
//! [`ModelFamily`].

pub mod stats;
mod iln;
mod short_rate;

pub use iln::calibrate_iln;
pub use short_rate::{calibrate_cir1f, calibrate_vasicek1f};

use serde::{Deserialize, Serialize};

use crate::error::{EsgError, EsgResult};
use crate::history::{HistoricalSeries, MONTHLY_DT};
use crate::params::ParameterSet;

/// Model families that can be fitted from a single historical series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Iln,
    Vasicek1f,
    Cir1f,
}

/// Calibration settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrator {
    /// Observation step in years; overrides the series' own step when set
    pub dt: Option<f64>,
    /// Constant added to levels before a CIR fit
    pub shift: f64,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self {
            dt: None,
            shift: 0.0,
        }
    }
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    pub fn with_shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    /// Fit `family` to `series`
    ///
    /// For ILN the series must already hold log-returns (see
    /// [`HistoricalSeries::log_returns`]); for the short-rate models it holds levels.
    pub fn calibrate(&self, family: ModelFamily, series: &HistoricalSeries) -> EsgResult<ParameterSet> {
        let dt = self.dt.unwrap_or_else(|| series.dt());
        let values = series.values();

        let params = match family {
            ModelFamily::Iln => ParameterSet::Iln(calibrate_iln(values, dt)?),
            ModelFamily::Vasicek1f => ParameterSet::Vasicek1f(calibrate_vasicek1f(values, dt)?),
            ModelFamily::Cir1f => ParameterSet::Cir1f(calibrate_cir1f(values, dt, self.shift)?),
        };

        log::info!(
            "Calibrated {} on {} observations (dt = {:.6}): {:?}",
            params.model_name(),
            values.len(),
            dt,
            params
        );
        if let Err(e) = params.validate() {
            log::warn!("Calibrated parameters fail validation: {}", e);
            return Err(e);
        }
        Ok(params)
    }

    /// Fit `family` to a bare monthly slice
    pub fn calibrate_values(&self, family: ModelFamily, values: &[f64]) -> EsgResult<ParameterSet> {
        let series = HistoricalSeries::new(values.to_vec(), self.dt.unwrap_or(MONTHLY_DT));
        self.calibrate(family, &series)
    }
}

/// Shared input checks: at least two finite observations and a positive step
pub(crate) fn validate_observations(field: &str, values: &[f64], dt: f64) -> EsgResult<()> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(EsgError::invalid("dt", format!("time step must be positive, got {}", dt)));
    }
    if values.len() < 2 {
        return Err(EsgError::invalid(
            field,
            format!("need at least 2 observations, got {}", values.len()),
        ));
    }
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(EsgError::invalid(
            format!("{}[{}]", field, i),
            format!("non-numeric observation {}", v),
        ));
    }
    Ok(())
}
