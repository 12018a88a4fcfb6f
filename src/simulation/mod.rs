//! Scenario simulation for short-rate and equity models

mod state;
mod engine;
mod short_rate;
mod equity;

pub use state::{EquityState, RegimeChain};
pub use engine::{ScenarioEngine, ScenarioOutput, SimulationConfig};
pub use short_rate::{cir_step, vasicek_step, DiffusionTruncation, FloorPolicy, ShortRateSimulator};
pub use equity::{iln_step_moments, EquitySimulator};
