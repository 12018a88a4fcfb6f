//! Equity return paths under ILN and RSLN
//!
//! Both models report, per step, the period log-return, the cumulative
//! log-return and the wealth ratio `exp(cumulative)`.

use super::engine::{run_trials, SimulationConfig};
use super::state::{EquityState, RegimeChain};
use crate::error::EsgResult;
use crate::params::{Iln, Rsln};
use crate::rng::{NoiseSource, StreamFactory};
use crate::scenario::{EquityScenario, ScenarioTable, TrialPath};

/// Per-step log-return moments implied by annual ILN parameters
///
/// Inverts the calibration annualization: `sigma_m = vol sqrt(dt)` and
/// `mu_m = ln(1 + mean) dt - sigma_m^2 / 2`.
pub fn iln_step_moments(p: &Iln, dt: f64) -> (f64, f64) {
    let sigma = p.vol * dt.sqrt();
    let mu = (1.0 + p.mean).ln() * dt - 0.5 * sigma * sigma;
    (mu, sigma)
}

/// One trial's three output series
struct EquityPath {
    returns: TrialPath,
    cumulative: TrialPath,
    wealth: TrialPath,
}

impl EquityPath {
    fn new(steps: usize, track_states: bool) -> Self {
        Self {
            returns: TrialPath::with_capacity(steps, track_states),
            cumulative: TrialPath::with_capacity(steps, track_states),
            wealth: TrialPath::with_capacity(steps, track_states),
        }
    }

    fn record(&mut self, log_return: f64, totals: &EquityState, regime: u8) {
        self.returns.push(log_return, regime);
        self.cumulative.push(totals.cumulative_log_return, regime);
        self.wealth.push(totals.wealth_ratio(), regime);
    }
}

/// Simulates equity return paths
#[derive(Debug, Clone)]
pub struct EquitySimulator {
    config: SimulationConfig,
}

impl EquitySimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Independent lognormal paths (no regime column)
    pub fn iln<F: StreamFactory>(&self, p: &Iln, streams: &F) -> EsgResult<EquityScenario> {
        self.config.validate()?;
        p.validate()?;

        let steps = self.config.t_steps();
        let (mu, sigma) = iln_step_moments(p, self.config.dt);
        log::info!(
            "Simulating iln: {} trials x {} steps (step mean {:.6}, step vol {:.6})",
            self.config.n_trials,
            steps,
            mu,
            sigma
        );

        let paths = run_trials(&self.config, streams, |noise| {
            let mut path = EquityPath::new(steps as usize, false);
            let mut totals = EquityState::default();
            for _ in 0..steps {
                let log_return = mu + sigma * noise.standard_normal();
                totals.accumulate(log_return);
                path.record(log_return, &totals, 0);
            }
            path
        });
        self.assemble(paths, None)
    }

    /// Regime-switching lognormal paths
    ///
    /// Each step first evaluates the regime transition (one uniform draw), then
    /// draws the return from the post-transition regime (one normal draw). With
    /// `detail` set, every row carries that regime.
    pub fn rsln<F: StreamFactory>(&self, p: &Rsln, streams: &F) -> EsgResult<EquityScenario> {
        self.config.validate()?;
        p.validate()?;

        let steps = self.config.t_steps();
        let detail = self.config.detail;
        let initial_state = self.config.initial_state;
        log::info!(
            "Simulating rsln: {} trials x {} steps from regime {} (stationary p1 = {:.4})",
            self.config.n_trials,
            steps,
            initial_state,
            p.stationary_probability()
        );

        let paths = run_trials(&self.config, streams, |noise| {
            let mut path = EquityPath::new(steps as usize, detail);
            let mut chain = RegimeChain::new(initial_state, p.pswitch);
            let mut totals = EquityState::default();
            for _ in 0..steps {
                let regime = chain.advance(noise.uniform());
                let s = regime as usize;
                let log_return = p.means[s] + p.vols[s] * noise.standard_normal();
                totals.accumulate(log_return);
                path.record(log_return, &totals, regime);
            }
            path
        });
        self.assemble(paths, Some(initial_state))
    }

    fn assemble(&self, paths: Vec<EquityPath>, initial_state: Option<u8>) -> EsgResult<EquityScenario> {
        let dt = self.config.dt;
        let mut returns = Vec::with_capacity(paths.len());
        let mut cumulative = Vec::with_capacity(paths.len());
        let mut wealth = Vec::with_capacity(paths.len());
        for path in paths {
            returns.push(path.returns);
            cumulative.push(path.cumulative);
            wealth.push(path.wealth);
        }
        Ok(EquityScenario {
            returns: ScenarioTable::from_paths(returns, dt, initial_state)?,
            cumulative: ScenarioTable::from_paths(cumulative, dt, initial_state)?,
            wealth: ScenarioTable::from_paths(wealth, dt, initial_state)?,
        })
    }
}
