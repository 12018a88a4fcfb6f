//! Economic Scenario Generator - calibration and simulation engine for actuarial capital models
//!
//! This library provides:
//! - Regression-based calibration of ILN, one-factor Vasicek and one-factor CIR models
//! - Euler simulation of Vasicek (one and two factor) and CIR short rates
//! - ILN and regime-switching lognormal (RSLN) equity return paths
//! - Seeded, per-trial random streams for reproducible (and parallel) runs
//! - Tidy `(trial, time, value[, state])` scenario tables for downstream summaries

pub mod error;
pub mod rng;
pub mod scenario;
pub mod params;
pub mod history;
pub mod calibration;
pub mod simulation;

// Re-export commonly used types
pub use error::{EsgError, EsgResult};
pub use rng::{ConstantNoise, NoiseSource, RandomPathGenerator, StreamFactory};
pub use scenario::{EquityScenario, ScenarioRecord, ScenarioTable};
pub use params::{Cir1f, Iln, ParameterSet, Rsln, Vasicek1f, Vasicek2f};
pub use history::HistoricalSeries;
pub use calibration::{Calibrator, ModelFamily};
pub use simulation::{EquitySimulator, ScenarioEngine, ScenarioOutput, ShortRateSimulator, SimulationConfig};
