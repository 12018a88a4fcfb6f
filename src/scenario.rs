//! Scenario tables: the tidy output shared by every simulator
//!
//! A table is a long-format list of `(trial, time, value[, state])` records,
//! grouped by trial with times increasing inside each trial. Downstream
//! summarization groups by `time`, so the field names and shapes here are
//! part of the external contract.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{EsgError, EsgResult};

/// One simulated observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Trial number (1-based)
    pub trial: u32,
    /// Time in years from the start of the projection
    pub time: f64,
    pub value: f64,
    /// Regime in force over the step (only for detailed regime-switching output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u8>,
}

/// Values (and optionally regimes) of a single trial, one entry per step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialPath {
    pub values: Vec<f64>,
    pub states: Option<Vec<u8>>,
}

impl TrialPath {
    pub fn with_capacity(steps: usize, track_states: bool) -> Self {
        Self {
            values: Vec::with_capacity(steps),
            states: track_states.then(|| Vec::with_capacity(steps)),
        }
    }

    pub fn push(&mut self, value: f64, state: u8) {
        self.values.push(value);
        if let Some(states) = self.states.as_mut() {
            states.push(state);
        }
    }
}

/// Immutable table of simulated records
///
/// Serialize through [`write_csv`](Self::write_csv) or [`to_json`](Self::to_json),
/// which emit the flat record layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    records: Vec<ScenarioRecord>,
    n_trials: u32,
    steps_per_trial: u32,
    dt: f64,
    has_state: bool,
    includes_initial: bool,
    initial_state: Option<u8>,
}

impl ScenarioTable {
    /// Assemble a table from per-trial paths, listed in trial order
    ///
    /// Step `k` (1-based) of every path is stamped with `time = k * dt`.
    /// `initial_state` is the regime used if the caller later prepends time 0.
    /// Every path must have the same number of steps, and either all paths or
    /// none carry one state per step.
    pub fn from_paths(paths: Vec<TrialPath>, dt: f64, initial_state: Option<u8>) -> EsgResult<Self> {
        let n_trials = paths.len() as u32;
        let steps_per_trial = paths.first().map(|p| p.values.len()).unwrap_or(0);
        let has_state = paths.first().map(|p| p.states.is_some()).unwrap_or(false);

        for (i, path) in paths.iter().enumerate() {
            if path.values.len() != steps_per_trial {
                return Err(EsgError::invalid(
                    format!("paths[{}]", i),
                    format!("{} steps, expected {}", path.values.len(), steps_per_trial),
                ));
            }
            match &path.states {
                Some(states) if !has_state || states.len() != steps_per_trial => {
                    return Err(EsgError::invalid(
                        format!("paths[{}].states", i),
                        format!("{} states for {} steps", states.len(), steps_per_trial),
                    ));
                }
                None if has_state => {
                    return Err(EsgError::invalid(format!("paths[{}].states", i), "missing states"));
                }
                _ => {}
            }
        }

        let mut records = Vec::with_capacity(n_trials as usize * steps_per_trial);
        for (i, path) in paths.into_iter().enumerate() {
            let trial = i as u32 + 1;
            for (k, &value) in path.values.iter().enumerate() {
                let step = k as u32 + 1;
                let state = path.states.as_ref().map(|s| s[k]);
                records.push(ScenarioRecord {
                    trial,
                    time: step as f64 * dt,
                    value,
                    state,
                });
            }
        }

        Ok(Self {
            records,
            n_trials,
            steps_per_trial: steps_per_trial as u32,
            dt,
            has_state,
            includes_initial: false,
            initial_state: if has_state { initial_state } else { None },
        })
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn trial_count(&self) -> u32 {
        self.n_trials
    }

    /// Number of records per trial (including the time-0 record once prepended)
    pub fn steps_per_trial(&self) -> u32 {
        self.steps_per_trial
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Whether records carry the regime `state` field
    pub fn has_state(&self) -> bool {
        self.has_state
    }

    /// Records of one trial (1-based), in time order
    pub fn trial(&self, trial: u32) -> &[ScenarioRecord] {
        if trial == 0 || trial > self.n_trials {
            return &[];
        }
        let width = self.steps_per_trial as usize;
        let start = (trial as usize - 1) * width;
        &self.records[start..start + width]
    }

    /// Values of every trial at step index `step` (step 1 is the first simulated step)
    ///
    /// Step 0 is only available after [`with_initial`](Self::with_initial).
    pub fn cross_section(&self, step: u32) -> Vec<f64> {
        let offset = if self.includes_initial {
            step as usize
        } else if step == 0 {
            return Vec::new();
        } else {
            step as usize - 1
        };
        if offset >= self.steps_per_trial as usize {
            return Vec::new();
        }
        (1..=self.n_trials)
            .map(|t| self.trial(t)[offset].value)
            .collect()
    }

    /// Last value of every trial
    pub fn final_values(&self) -> Vec<f64> {
        (1..=self.n_trials)
            .filter_map(|t| self.trial(t).last().map(|r| r.value))
            .collect()
    }

    /// Copy of the table with a time-0 record carrying `initial` prepended to each trial
    pub fn with_initial(&self, initial: f64) -> Self {
        if self.includes_initial {
            return self.clone();
        }
        let mut records = Vec::with_capacity(self.records.len() + self.n_trials as usize);
        let initial_state = if self.has_state {
            Some(self.initial_state.unwrap_or(0))
        } else {
            None
        };
        for trial in 1..=self.n_trials {
            records.push(ScenarioRecord {
                trial,
                time: 0.0,
                value: initial,
                state: initial_state,
            });
            records.extend_from_slice(self.trial(trial));
        }
        Self {
            records,
            steps_per_trial: self.steps_per_trial + 1,
            includes_initial: true,
            ..self.clone()
        }
    }

    /// Write the table as CSV with header `trial,time,value[,state]`
    pub fn write_csv<W: Write>(&self, writer: W) -> EsgResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.has_state {
            wtr.write_record(["trial", "time", "value", "state"])?;
        } else {
            wtr.write_record(["trial", "time", "value"])?;
        }
        for rec in &self.records {
            let mut row = vec![rec.trial.to_string(), rec.time.to_string(), rec.value.to_string()];
            if let Some(state) = rec.state {
                row.push(state.to_string());
            }
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// JSON array of flat record objects
    pub fn to_json(&self) -> EsgResult<String> {
        Ok(serde_json::to_string(&self.records)?)
    }
}

/// Output of an equity simulation: three tables keyed by the same `(trial, time)`
#[derive(Debug, Clone, PartialEq)]
pub struct EquityScenario {
    /// Log-return earned over each step
    pub returns: ScenarioTable,
    /// Cumulative log-return since time 0
    pub cumulative: ScenarioTable,
    /// Wealth ratio `exp(cumulative)`
    pub wealth: ScenarioTable,
}

impl EquityScenario {
    /// Named tables, in output order
    pub fn tables(&self) -> [(&'static str, &ScenarioTable); 3] {
        [
            ("returns", &self.returns),
            ("cumulative", &self.cumulative),
            ("wealth", &self.wealth),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_trials(track_states: bool) -> ScenarioTable {
        let mut p1 = TrialPath::with_capacity(3, track_states);
        let mut p2 = TrialPath::with_capacity(3, track_states);
        for (i, v) in [0.01, 0.02, 0.03].iter().enumerate() {
            p1.push(*v, (i % 2) as u8);
            p2.push(-v, 1);
        }
        ScenarioTable::from_paths(vec![p1, p2], 1.0 / 12.0, Some(0)).unwrap()
    }

    #[test]
    fn test_layout_and_times() {
        let table = two_trials(false);
        assert_eq!(table.len(), 6);
        assert_eq!(table.trial_count(), 2);
        assert_eq!(table.steps_per_trial(), 3);

        let t2 = table.trial(2);
        assert_eq!(t2.len(), 3);
        assert!(t2.iter().all(|r| r.trial == 2));
        assert!((t2[0].time - 1.0 / 12.0).abs() < 1e-15);
        assert!((t2[2].time - 0.25).abs() < 1e-15);
        assert!(t2.windows(2).all(|w| w[0].time < w[1].time));
        assert!(table.trial(0).is_empty());
        assert!(table.trial(3).is_empty());
    }

    #[test]
    fn test_ragged_paths_rejected() {
        let mut long = TrialPath::with_capacity(3, false);
        let mut short = TrialPath::with_capacity(1, false);
        for v in [0.01, 0.02, 0.03] {
            long.push(v, 0);
        }
        short.push(0.04, 0);

        let err = ScenarioTable::from_paths(vec![long, short], 1.0 / 12.0, None).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("paths[1]"));
    }

    #[test]
    fn test_state_length_must_match_values() {
        let mut path = TrialPath::with_capacity(3, true);
        for v in [0.01, 0.02, 0.03] {
            path.push(v, 1);
        }
        path.states = Some(vec![1]);
        let err = ScenarioTable::from_paths(vec![path], 1.0 / 12.0, Some(0)).unwrap_err();
        assert!(err.to_string().contains("paths[0].states"));

        let mut tracked = TrialPath::with_capacity(1, true);
        let mut untracked = TrialPath::with_capacity(1, false);
        tracked.push(0.01, 0);
        untracked.push(0.02, 0);
        assert!(ScenarioTable::from_paths(vec![tracked.clone(), untracked.clone()], 1.0, None).is_err());
        assert!(ScenarioTable::from_paths(vec![untracked, tracked], 1.0, None).is_err());
    }

    #[test]
    fn test_no_paths_gives_empty_table() {
        let table = ScenarioTable::from_paths(Vec::new(), 1.0, None).unwrap();
        assert!(table.is_empty());
        assert!(table.final_values().is_empty());
    }

    #[test]
    fn test_state_all_or_nothing() {
        let plain = two_trials(false);
        assert!(!plain.has_state());
        assert!(plain.records().iter().all(|r| r.state.is_none()));

        let detailed = two_trials(true);
        assert!(detailed.has_state());
        assert!(detailed.records().iter().all(|r| r.state.is_some()));
    }

    #[test]
    fn test_cross_section() {
        let table = two_trials(false);
        assert_eq!(table.cross_section(2), vec![0.02, -0.02]);
        assert!(table.cross_section(0).is_empty());
        assert!(table.cross_section(4).is_empty());
        assert_eq!(table.final_values(), vec![0.03, -0.03]);
    }

    #[test]
    fn test_with_initial_prepends_time_zero() {
        let table = two_trials(true).with_initial(0.05);
        assert_eq!(table.len(), 8);
        assert_eq!(table.steps_per_trial(), 4);

        let t1 = table.trial(1);
        assert_eq!(t1[0].time, 0.0);
        assert_eq!(t1[0].value, 0.05);
        assert_eq!(t1[0].state, Some(0));
        assert_eq!(t1[1].value, 0.01);
        assert_eq!(table.cross_section(0), vec![0.05, 0.05]);
        assert_eq!(table.cross_section(1), vec![0.01, -0.01]);
    }

    #[test]
    fn test_csv_header_without_state() {
        let mut buf = Vec::new();
        two_trials(false).write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("trial,time,value"));
        assert_eq!(lines.count(), 6);
    }

    #[test]
    fn test_csv_header_with_state() {
        let mut buf = Vec::new();
        two_trials(true).write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("trial,time,value,state\n"));
        assert!(text.lines().skip(1).all(|l| l.split(',').count() == 4));
    }

    #[test]
    fn test_json_omits_missing_state() {
        let json = two_trials(false).to_json().unwrap();
        assert!(json.starts_with(r#"[{"trial":1,"time":"#));
        assert!(!json.contains("records"));
        assert!(!json.contains("state"));
        let parsed: Vec<ScenarioRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 6);

        let detailed = two_trials(true).to_json().unwrap();
        assert!(detailed.contains("\"state\":1"));
    }
}
