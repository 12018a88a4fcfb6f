//! Model parameter sets
//!
//! One variant per model family. Parameter sets are plain values: calibration
//! produces them, simulation only reads them.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::error::{EsgError, EsgResult};

pub use loader::{load_parameters, load_parameters_from_reader, save_parameters};

/// One-factor Vasicek short rate: `dr = a(b - r)dt + v dW`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vasicek1f {
    /// Initial level
    pub r0: f64,
    /// Annualized mean-reversion speed
    pub a: f64,
    /// Mean-reversion level
    #[serde(default)]
    pub b: f64,
    /// Annualized volatility
    pub v: f64,
    /// Floor applied after each simulated step
    #[serde(default)]
    pub rmin: Option<f64>,
}

impl Vasicek1f {
    /// Default inflation preset
    pub fn inflation_default() -> Self {
        Self {
            r0: 0.01,
            a: 0.4,
            b: 0.048,
            v: 0.04,
            rmin: Some(-0.02),
        }
    }

    pub fn validate(&self, field: &str) -> EsgResult<()> {
        check_finite(field, "r0", self.r0)?;
        check_finite(field, "a", self.a)?;
        check_finite(field, "b", self.b)?;
        check_vol(field, "v", self.v)?;
        if let Some(rmin) = self.rmin {
            check_finite(field, "rmin", rmin)?;
        }
        if self.a <= 0.0 {
            log::warn!("{}: non-positive mean reversion a = {}; paths will not revert", field, self.a);
        }
        Ok(())
    }
}

/// Two independent Vasicek factors whose levels are summed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vasicek2f {
    pub short: Vasicek1f,
    pub long: Vasicek1f,
}

impl Vasicek2f {
    /// Default two-factor nominal rate preset
    pub fn nominal_default() -> Self {
        Self {
            short: Vasicek1f {
                r0: 0.0,
                a: 1.0,
                b: 0.0,
                v: 0.01,
                rmin: Some(-0.05),
            },
            long: Vasicek1f {
                r0: 0.007,
                a: 0.1,
                b: 0.028,
                v: 0.0165,
                rmin: None,
            },
        }
    }

    /// Combined initial level
    pub fn r0(&self) -> f64 {
        self.short.r0 + self.long.r0
    }

    pub fn validate(&self) -> EsgResult<()> {
        self.short.validate("vasicek2f.short")?;
        self.long.validate("vasicek2f.long")
    }
}

/// One-factor Cox-Ingersoll-Ross short rate: `dr = a(b - r)dt + v sqrt(r) dW`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cir1f {
    pub r0: f64,
    pub a: f64,
    pub b: f64,
    pub v: f64,
}

impl Cir1f {
    pub fn validate(&self) -> EsgResult<()> {
        check_finite("cir1f", "r0", self.r0)?;
        check_finite("cir1f", "a", self.a)?;
        check_finite("cir1f", "b", self.b)?;
        check_vol("cir1f", "v", self.v)?;
        if self.a <= 0.0 {
            log::warn!("cir1f: non-positive mean reversion a = {}", self.a);
        } else if 2.0 * self.a * self.b < self.v * self.v {
            log::warn!(
                "cir1f: Feller condition 2ab >= v^2 violated ({} < {}); expect paths at zero",
                2.0 * self.a * self.b,
                self.v * self.v
            );
        }
        Ok(())
    }
}

/// Independent lognormal equity returns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Iln {
    /// Annualized arithmetic mean return
    pub mean: f64,
    /// Annualized log-return volatility
    pub vol: f64,
}

impl Iln {
    pub fn validate(&self) -> EsgResult<()> {
        check_finite("iln", "mean", self.mean)?;
        if self.mean <= -1.0 {
            return Err(EsgError::invalid("iln.mean", format!("must exceed -1, got {}", self.mean)));
        }
        check_vol("iln", "vol", self.vol)
    }
}

/// Two-regime switching lognormal equity returns (monthly parameters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rsln {
    /// `[p(0 -> 1), p(1 -> 0)]`
    pub pswitch: [f64; 2],
    /// Monthly log-return mean per regime
    pub means: [f64; 2],
    /// Monthly log-return volatility per regime
    pub vols: [f64; 2],
}

impl Rsln {
    /// Monthly TSE 300 total-return estimates published by Hardy (2001)
    pub fn hardy_2001() -> Self {
        Self {
            pswitch: [0.0371, 0.2101],
            means: [0.0123, -0.0157],
            vols: [0.0347, 0.0778],
        }
    }

    /// Long-run probability of regime 1: `p01 / (p01 + p10)`
    pub fn stationary_probability(&self) -> f64 {
        let total = self.pswitch[0] + self.pswitch[1];
        if total <= 0.0 {
            0.0
        } else {
            self.pswitch[0] / total
        }
    }

    /// Probabilities must lie in the closed interval [0, 1]
    ///
    /// The endpoints are accepted on purpose: `0` pins a regime and `1` forces a
    /// switch every step, which gives deterministic chains.
    pub fn validate(&self) -> EsgResult<()> {
        for (i, &p) in self.pswitch.iter().enumerate() {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(EsgError::invalid(
                    format!("rsln.pswitch[{}]", i),
                    format!("probability must be in [0, 1], got {}", p),
                ));
            }
        }
        for i in 0..2 {
            check_finite("rsln", &format!("means[{}]", i), self.means[i])?;
            check_vol("rsln", &format!("vols[{}]", i), self.vols[i])?;
        }
        Ok(())
    }
}

/// Parameters for one model family
///
/// Serialized externally tagged by model name, e.g. `{"iln": {"mean": 0.08, "vol": 0.16}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSet {
    Vasicek1f(Vasicek1f),
    Vasicek2f(Vasicek2f),
    Cir1f(Cir1f),
    Iln(Iln),
    Rsln(Rsln),
}

impl ParameterSet {
    /// Model family name as used in serialized form
    pub fn model_name(&self) -> &'static str {
        match self {
            ParameterSet::Vasicek1f(_) => "vasicek1f",
            ParameterSet::Vasicek2f(_) => "vasicek2f",
            ParameterSet::Cir1f(_) => "cir1f",
            ParameterSet::Iln(_) => "iln",
            ParameterSet::Rsln(_) => "rsln",
        }
    }

    pub fn validate(&self) -> EsgResult<()> {
        match self {
            ParameterSet::Vasicek1f(p) => p.validate("vasicek1f"),
            ParameterSet::Vasicek2f(p) => p.validate(),
            ParameterSet::Cir1f(p) => p.validate(),
            ParameterSet::Iln(p) => p.validate(),
            ParameterSet::Rsln(p) => p.validate(),
        }
    }

    /// Built-in parameter presets
    pub fn presets() -> Vec<(&'static str, ParameterSet)> {
        vec![
            ("inflation", ParameterSet::Vasicek1f(Vasicek1f::inflation_default())),
            ("nominal", ParameterSet::Vasicek2f(Vasicek2f::nominal_default())),
            ("equity_rsln", ParameterSet::Rsln(Rsln::hardy_2001())),
        ]
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<ParameterSet> {
        Self::presets()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p)
    }
}

impl From<Vasicek1f> for ParameterSet {
    fn from(p: Vasicek1f) -> Self {
        ParameterSet::Vasicek1f(p)
    }
}

impl From<Vasicek2f> for ParameterSet {
    fn from(p: Vasicek2f) -> Self {
        ParameterSet::Vasicek2f(p)
    }
}

impl From<Cir1f> for ParameterSet {
    fn from(p: Cir1f) -> Self {
        ParameterSet::Cir1f(p)
    }
}

impl From<Iln> for ParameterSet {
    fn from(p: Iln) -> Self {
        ParameterSet::Iln(p)
    }
}

impl From<Rsln> for ParameterSet {
    fn from(p: Rsln) -> Self {
        ParameterSet::Rsln(p)
    }
}

fn check_finite(model: &str, name: &str, value: f64) -> EsgResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EsgError::invalid(format!("{}.{}", model, name), format!("must be finite, got {}", value)))
    }
}

fn check_vol(model: &str, name: &str, value: f64) -> EsgResult<()> {
    check_finite(model, name, value)?;
    if value < 0.0 {
        return Err(EsgError::invalid(
            format!("{}.{}", model, name),
            format!("volatility must be non-negative, got {}", value),
        ));
    }
    Ok(())
}
