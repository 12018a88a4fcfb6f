//! Per-path state carried from one simulated step to the next

/// Two-state Markov regime chain
///
/// The regime reported for a step is the one in force *after* that step's
/// transition has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeChain {
    /// Current regime (0 or 1)
    state: u8,
    /// `[p(0 -> 1), p(1 -> 0)]`
    pswitch: [f64; 2],
}

impl RegimeChain {
    pub fn new(initial_state: u8, pswitch: [f64; 2]) -> Self {
        Self {
            state: initial_state.min(1),
            pswitch,
        }
    }

    pub fn state(&self) -> u8 {
        self.state
    }

    /// Evaluate one transition with uniform draw `u` in [0, 1) and return the new regime
    pub fn advance(&mut self, u: f64) -> u8 {
        if u < self.pswitch[self.state as usize] {
            self.state = 1 - self.state;
        }
        self.state
    }
}

/// Running equity totals for one trial
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EquityState {
    /// Sum of log-returns so far
    pub cumulative_log_return: f64,
}

impl EquityState {
    /// Add one period's log-return
    pub fn accumulate(&mut self, log_return: f64) {
        self.cumulative_log_return += log_return;
    }

    /// Wealth relative to time 0
    pub fn wealth_ratio(&self) -> f64 {
        self.cumulative_log_return.exp()
    }
}
