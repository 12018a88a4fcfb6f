//! Euler discretization of one- and two-factor short-rate models
//!
//! Vasicek: `r' = r + a(b - r)dt + v sqrt(dt) Z`, then `max(r', rmin)` when a floor is set.
//! The floored level is the base of the next step.
//!
//! CIR: `r' = r + a(b - r)dt + v sqrt(max(r, 0)) sqrt(dt) Z` (full truncation). The level
//! itself may go negative; only the diffusion argument is truncated.

use serde::{Deserialize, Serialize};

use super::engine::{run_trials, SimulationConfig};
use crate::error::EsgResult;
use crate::params::{Cir1f, Vasicek1f, Vasicek2f};
use crate::rng::{NoiseSource, StreamFactory};
use crate::scenario::{ScenarioTable, TrialPath};

/// Whether the Vasicek `rmin` floor is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloorPolicy {
    /// Clamp each step at `rmin` when one is set
    #[default]
    Apply,
    /// Leave `rmin` unused
    Ignore,
}

/// Treatment of a negative level inside the CIR diffusion coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiffusionTruncation {
    /// `sqrt(max(r, 0))`
    #[default]
    Truncate,
    /// `sqrt(|r|)`
    Reflect,
}

/// One Vasicek step from level `r` with normal draw `z`
pub fn vasicek_step(p: &Vasicek1f, r: f64, dt: f64, z: f64, floor: FloorPolicy) -> f64 {
    let next = r + p.a * (p.b - r) * dt + p.v * dt.sqrt() * z;
    match (floor, p.rmin) {
        (FloorPolicy::Apply, Some(rmin)) => next.max(rmin),
        _ => next,
    }
}

/// One CIR step from level `r` with normal draw `z`
pub fn cir_step(p: &Cir1f, r: f64, dt: f64, z: f64, truncation: DiffusionTruncation) -> f64 {
    let diffusion_level = match truncation {
        DiffusionTruncation::Truncate => r.max(0.0),
        DiffusionTruncation::Reflect => r.abs(),
    };
    r + p.a * (p.b - r) * dt + p.v * diffusion_level.sqrt() * dt.sqrt() * z
}

/// Simulates short-rate paths
#[derive(Debug, Clone)]
pub struct ShortRateSimulator {
    config: SimulationConfig,
}

impl ShortRateSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// One-factor Vasicek paths
    pub fn vasicek1f<F: StreamFactory>(&self, p: &Vasicek1f, streams: &F) -> EsgResult<ScenarioTable> {
        self.config.validate()?;
        p.validate("vasicek1f")?;

        let (steps, dt, floor) = (self.config.t_steps(), self.config.dt, self.config.floor);
        self.log_start("vasicek1f", steps);

        let paths = run_trials(&self.config, streams, |noise| {
            let mut path = TrialPath::with_capacity(steps as usize, false);
            let mut r = p.r0;
            for _ in 0..steps {
                r = vasicek_step(p, r, dt, noise.standard_normal(), floor);
                path.push(r, 0);
            }
            path
        });
        ScenarioTable::from_paths(paths, dt, None)
    }

    /// Two independent Vasicek factors; each output value is `short + long`
    ///
    /// Every step draws the short factor's normal first, then the long factor's.
    pub fn vasicek2f<F: StreamFactory>(&self, p: &Vasicek2f, streams: &F) -> EsgResult<ScenarioTable> {
        self.config.validate()?;
        p.validate()?;

        let (steps, dt, floor) = (self.config.t_steps(), self.config.dt, self.config.floor);
        self.log_start("vasicek2f", steps);

        let paths = run_trials(&self.config, streams, |noise| {
            let mut path = TrialPath::with_capacity(steps as usize, false);
            let (mut short, mut long) = (p.short.r0, p.long.r0);
            for _ in 0..steps {
                short = vasicek_step(&p.short, short, dt, noise.standard_normal(), floor);
                long = vasicek_step(&p.long, long, dt, noise.standard_normal(), floor);
                path.push(short + long, 0);
            }
            path
        });
        ScenarioTable::from_paths(paths, dt, None)
    }

    /// One-factor CIR paths
    pub fn cir1f<F: StreamFactory>(&self, p: &Cir1f, streams: &F) -> EsgResult<ScenarioTable> {
        self.config.validate()?;
        p.validate()?;

        let (steps, dt, truncation) = (self.config.t_steps(), self.config.dt, self.config.truncation);
        self.log_start("cir1f", steps);

        let paths = run_trials(&self.config, streams, |noise| {
            let mut path = TrialPath::with_capacity(steps as usize, false);
            let mut r = p.r0;
            for _ in 0..steps {
                r = cir_step(p, r, dt, noise.standard_normal(), truncation);
                path.push(r, 0);
            }
            path
        });
        ScenarioTable::from_paths(paths, dt, None)
    }

    fn log_start(&self, model: &str, steps: u32) {
        log::info!(
            "Simulating {}: {} trials x {} steps (dt = {:.6})",
            model,
            self.config.n_trials,
            steps,
            self.config.dt
        );
    }
}
