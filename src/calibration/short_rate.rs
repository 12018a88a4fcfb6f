//! Short-rate calibration by linear regression on the discretized SDEs
//!
//! Vasicek: the Euler step is an AR(1), `x[i+1] = b0 + b1 x[i] + e`, so
//! `a = (1 - b1) / dt` and `b = b0 / (1 - b1)`.
//!
//! CIR: dividing the Euler step by `sqrt(r[i-1])` gives homoscedastic errors,
//! `dr / sqrt(r) = b1 / sqrt(r) + b2 sqrt(r) + e` with `b1 = a b dt` and `b2 = -a dt`.
//!
//! In both cases the volatility is `sqrt(mean(e^2) / dt)`.

use super::stats::ols;
use super::validate_observations;
use crate::error::{EsgError, EsgResult};
use crate::params::{Cir1f, Vasicek1f};

/// Fitted per-step mean reversion `a dt` below this leaves the reversion level undefined
const MEAN_REVERSION_TOLERANCE: f64 = 1e-10;

/// Fit one-factor Vasicek parameters to rate levels observed every `dt` years
///
/// `r0` is the last observation; no floor is set.
pub fn calibrate_vasicek1f(levels: &[f64], dt: f64) -> EsgResult<Vasicek1f> {
    validate_observations("levels", levels, dt)?;
    if levels.len() < 3 {
        return Err(EsgError::invalid(
            "levels",
            format!("AR(1) regression needs at least 3 levels, got {}", levels.len()),
        ));
    }

    let previous = &levels[..levels.len() - 1];
    let next = &levels[1..];
    let fit = ols(&[previous], next, true)?;
    let (b0, b1) = (fit.coefficients[0], fit.coefficients[1]);

    let persistence_gap = 1.0 - b1;
    if persistence_gap.abs() < MEAN_REVERSION_TOLERANCE || !persistence_gap.is_finite() {
        return Err(EsgError::invalid(
            "levels",
            "AR(1) slope is 1; mean-reversion level is undefined",
        ));
    }

    let params = Vasicek1f {
        r0: levels[levels.len() - 1],
        a: persistence_gap / dt,
        b: b0 / persistence_gap,
        v: (fit.residual_mean_square() / dt).sqrt(),
        rmin: None,
    };
    log::debug!("vasicek1f AR(1) fit: b0={} b1={} -> {:?}", b0, b1, params);
    Ok(params)
}

/// Fit one-factor CIR parameters to rate levels observed every `dt` years
///
/// `shift` is added to every level first, so series that dip below zero
/// (e.g. inflation) can still be fitted. `r0` is the last shifted level.
pub fn calibrate_cir1f(levels: &[f64], dt: f64, shift: f64) -> EsgResult<Cir1f> {
    validate_observations("levels", levels, dt)?;
    if !shift.is_finite() {
        return Err(EsgError::invalid("shift", format!("must be finite, got {}", shift)));
    }

    let shifted: Vec<f64> = levels.iter().map(|r| r + shift).collect();
    if let Some((i, r)) = shifted.iter().enumerate().find(|(_, r)| **r <= 0.0) {
        return Err(EsgError::invalid(
            format!("levels[{}]", i),
            format!("shifted level {} is not positive; increase the shift", r),
        ));
    }
    if shifted.len() < 3 {
        return Err(EsgError::invalid(
            "levels",
            format!("CIR regression needs at least 3 levels, got {}", shifted.len()),
        ));
    }

    let n = shifted.len() - 1;
    let mut response = Vec::with_capacity(n);
    let mut inv_sqrt = Vec::with_capacity(n);
    let mut sqrt = Vec::with_capacity(n);
    for w in shifted.windows(2) {
        let root = w[0].sqrt();
        response.push((w[1] - w[0]) / root);
        inv_sqrt.push(1.0 / root);
        sqrt.push(root);
    }

    let fit = ols(&[&inv_sqrt, &sqrt], &response, false)?;
    let (beta1, beta2) = (fit.coefficients[0], fit.coefficients[1]);
    if beta2.abs() < MEAN_REVERSION_TOLERANCE || !beta2.is_finite() {
        return Err(EsgError::invalid(
            "levels",
            "regression slope on sqrt(r) is zero; mean-reversion level is undefined",
        ));
    }

    let params = Cir1f {
        r0: shifted[shifted.len() - 1],
        a: -beta2 / dt,
        b: -beta1 / beta2,
        v: (fit.residual_mean_square() / dt).sqrt(),
    };
    log::debug!("cir1f fit (shift {}): beta1={} beta2={} -> {:?}", shift, beta1, beta2, params);
    Ok(params)
}
