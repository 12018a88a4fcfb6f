//! Historical observation series used as calibration input

pub mod loader;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EsgError, EsgResult};

pub use loader::{load_series, load_series_from_reader};

/// Monthly step in years
pub const MONTHLY_DT: f64 = 1.0 / 12.0;

/// Ordered observations at a fixed time step
///
/// Values are rate levels or log-returns depending on the model being fitted.
/// The optional date axis is carried along for reporting only; estimators never
/// look at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    values: Vec<f64>,
    dates: Option<Vec<NaiveDate>>,
    /// Time step between observations, in years
    dt: f64,
}

impl HistoricalSeries {
    pub fn new(values: Vec<f64>, dt: f64) -> Self {
        Self {
            values,
            dates: None,
            dt,
        }
    }

    /// Monthly series
    pub fn monthly(values: Vec<f64>) -> Self {
        Self::new(values, MONTHLY_DT)
    }

    /// Series with a date axis; lengths must agree
    pub fn with_dates(values: Vec<f64>, dates: Vec<NaiveDate>, dt: f64) -> EsgResult<Self> {
        if values.len() != dates.len() {
            return Err(EsgError::invalid(
                "dates",
                format!("{} dates for {} values", dates.len(), values.len()),
            ));
        }
        Ok(Self {
            values,
            dates: Some(dates),
            dt,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent observation
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Convert a series of price or index levels into log-returns `ln(p_i / p_{i-1})`
    ///
    /// The result has one fewer observation; dates keep the end of each period.
    pub fn log_returns(&self) -> EsgResult<Self> {
        if self.values.len() < 2 {
            return Err(EsgError::invalid(
                "series",
                format!("need at least 2 levels for returns, got {}", self.values.len()),
            ));
        }
        if let Some((i, p)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(EsgError::invalid(
                format!("series[{}]", i),
                format!("log-returns need positive finite levels, got {}", p),
            ));
        }

        let values = self.values.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let dates = self.dates.as_ref().map(|d| d[1..].to_vec());
        Ok(Self {
            values,
            dates,
            dt: self.dt,
        })
    }
}
