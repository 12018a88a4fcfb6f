//! Independent lognormal calibration

use super::stats::{mean, sample_std_dev};
use super::validate_observations;
use crate::error::EsgResult;
use crate::params::Iln;

/// Fit ILN parameters to a series of log-returns observed every `dt` years
///
/// With sample mean `mu` and standard deviation `sigma` of the log-returns:
/// `mean = exp((mu + sigma^2 / 2) / dt) - 1` and `vol = sigma / sqrt(dt)`.
pub fn calibrate_iln(log_returns: &[f64], dt: f64) -> EsgResult<Iln> {
    validate_observations("log_returns", log_returns, dt)?;

    let mu = mean(log_returns);
    let sigma = sample_std_dev(log_returns);

    Ok(Iln {
        mean: ((mu + 0.5 * sigma * sigma) / dt).exp() - 1.0,
        vol: sigma * (1.0 / dt).sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MONTHLY_DT;
    use approx::assert_relative_eq;

    #[test]
    fn test_four_point_closed_form() {
        let data = [0.01, -0.02, 0.03, 0.005];
        let params = calibrate_iln(&data, MONTHLY_DT).unwrap();

        let mu = (0.01 - 0.02 + 0.03 + 0.005) / 4.0;
        let ss: f64 = data.iter().map(|x| (x - mu) * (x - mu)).sum();
        let sigma = (ss / 3.0_f64).sqrt();

        assert_relative_eq!(params.mean, ((mu + 0.5 * sigma * sigma) * 12.0).exp() - 1.0, max_relative = 1e-12);
        assert_relative_eq!(params.vol, sigma * 12.0_f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_too_short() {
        let err = calibrate_iln(&[0.01], MONTHLY_DT).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_non_numeric() {
        assert!(calibrate_iln(&[0.01, f64::NAN, 0.02], MONTHLY_DT).is_err());
        assert!(calibrate_iln(&[0.01, f64::INFINITY], MONTHLY_DT).is_err());
    }

    #[test]
    fn test_annual_step() {
        let params = calibrate_iln(&[0.05, 0.07, 0.06], 1.0).unwrap();
        let sigma: f64 = 0.01;
        assert_relative_eq!(params.vol, sigma, max_relative = 1e-9);
        assert_relative_eq!(params.mean, (0.06 + 0.5 * sigma * sigma).exp() - 1.0, max_relative = 1e-9);
    }
}
