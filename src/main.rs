//! Economic Scenario Generator CLI
//!
//! Calibrate model parameters from a historical CSV series, or simulate
//! scenario tables from a parameter file or built-in preset.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use economic_scenarios::calibration::{Calibrator, ModelFamily};
use economic_scenarios::history::{load_series, MONTHLY_DT};
use economic_scenarios::params::{load_parameters, save_parameters, ParameterSet};
use economic_scenarios::scenario::ScenarioTable;
use economic_scenarios::simulation::{FloorPolicy, ScenarioEngine, SimulationConfig};

#[derive(Debug, Parser)]
#[command(name = "economic_scenarios", version, about = "Economic scenario generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fit a model to a historical series (CSV with a `value` column)
    Calibrate {
        #[arg(long, value_enum)]
        model: ModelArg,

        #[arg(long)]
        input: PathBuf,

        /// Observation step in years
        #[arg(long, default_value_t = MONTHLY_DT)]
        dt: f64,

        /// Constant added to levels before a CIR fit
        #[arg(long, default_value_t = 0.0)]
        shift: f64,

        /// Treat the input as price/index levels and convert to log-returns first
        #[arg(long)]
        from_levels: bool,

        /// Write parameters here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Simulate scenarios from a parameter file or preset
    Simulate {
        /// JSON parameter file
        #[arg(long, conflicts_with = "preset")]
        params: Option<PathBuf>,

        /// Built-in preset name (see `presets`)
        #[arg(long)]
        preset: Option<String>,

        #[arg(long, default_value_t = 1)]
        trials: u32,

        /// Horizon in years
        #[arg(long, default_value_t = 1.0)]
        years: f64,

        #[arg(long, default_value_t = MONTHLY_DT)]
        dt: f64,

        #[arg(long)]
        seed: Option<u64>,

        /// Include the regime column (RSLN only)
        #[arg(long)]
        detail: bool,

        /// Simulate trials across threads
        #[arg(long)]
        parallel: bool,

        /// Starting regime for RSLN
        #[arg(long, default_value_t = 0)]
        initial_state: u8,

        /// Do not apply Vasicek `rmin` floors
        #[arg(long)]
        no_floor: bool,

        /// Prepend the time-0 record to every trial
        #[arg(long)]
        with_initial: bool,

        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Output file; equity runs write one file per table with a suffix
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the built-in parameter presets
    Presets,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Iln,
    Vasicek1f,
    Cir1f,
}

impl From<ModelArg> for ModelFamily {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Iln => ModelFamily::Iln,
            ModelArg::Vasicek1f => ModelFamily::Vasicek1f,
            ModelArg::Cir1f => ModelFamily::Cir1f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Calibrate {
            model,
            input,
            dt,
            shift,
            from_levels,
            output,
        } => run_calibrate(model.into(), &input, dt, shift, from_levels, output.as_deref()),
        Command::Simulate {
            params,
            preset,
            trials,
            years,
            dt,
            seed,
            detail,
            parallel,
            initial_state,
            no_floor,
            with_initial,
            format,
            output,
        } => {
            let params = resolve_params(params.as_deref(), preset.as_deref())?;
            let config = SimulationConfig {
                n_trials: trials,
                horizon_years: years,
                dt,
                seed,
                detail,
                parallel,
                initial_state,
                floor: if no_floor { FloorPolicy::Ignore } else { FloorPolicy::Apply },
                ..SimulationConfig::default()
            };
            run_simulate(&params, config, with_initial, format, output.as_deref())
        }
        Command::Presets => {
            for (name, preset) in ParameterSet::presets() {
                println!("{}: {}", name, serde_json::to_string(&preset)?);
            }
            Ok(())
        }
    }
}

fn run_calibrate(
    family: ModelFamily,
    input: &Path,
    dt: f64,
    shift: f64,
    from_levels: bool,
    output: Option<&Path>,
) -> Result<()> {
    let mut series = load_series(input, dt)
        .with_context(|| format!("Failed to load series from {}", input.display()))?;
    if from_levels {
        series = series.log_returns().context("Failed to convert levels to log-returns")?;
    }

    let calibrator = Calibrator::new().with_dt(dt).with_shift(shift);
    let params = calibrator
        .calibrate(family, &series)
        .with_context(|| format!("Calibration of {:?} failed", family))?;

    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
            save_parameters(&params, file)?;
            println!("Parameters written to: {}", path.display());
        }
        None => {
            save_parameters(&params, io::stdout())?;
            println!();
        }
    }
    Ok(())
}

fn resolve_params(path: Option<&Path>, preset: Option<&str>) -> Result<ParameterSet> {
    match (path, preset) {
        (Some(path), _) => load_parameters(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display())),
        (None, Some(name)) => match ParameterSet::preset(name) {
            Some(params) => Ok(params),
            None => bail!("Unknown preset '{}'", name),
        },
        (None, None) => bail!("Either --params or --preset is required"),
    }
}

fn run_simulate(
    params: &ParameterSet,
    config: SimulationConfig,
    with_initial: bool,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let engine = ScenarioEngine::new(config);
    let result = engine
        .simulate(params)
        .with_context(|| format!("Simulation of {} failed", params.model_name()))?;

    let tables = result.tables();
    let single = tables.len() == 1;
    for (name, table) in tables {
        let table = if with_initial {
            table.with_initial(initial_value(params, name))
        } else {
            table.clone()
        };

        match output {
            Some(base) => {
                let path = if single { base.to_path_buf() } else { suffixed(base, name) };
                let file = File::create(&path).with_context(|| format!("Unable to create {}", path.display()))?;
                write_table(&table, format, BufWriter::new(file))?;
                eprintln!("{} table ({} records) written to: {}", name, table.len(), path.display());
            }
            None => write_table(&table, format, io::stdout().lock())?,
        }

        print_summary(name, &table);
    }
    Ok(())
}

/// Time-0 value of an output table
fn initial_value(params: &ParameterSet, table: &str) -> f64 {
    match (params, table) {
        (ParameterSet::Vasicek1f(p), _) => p.r0,
        (ParameterSet::Vasicek2f(p), _) => p.r0(),
        (ParameterSet::Cir1f(p), _) => p.r0,
        (_, "wealth") => 1.0,
        _ => 0.0,
    }
}

fn suffixed(base: &Path, name: &str) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("scenarios");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    base.with_file_name(format!("{}_{}.{}", stem, name, ext))
}

fn write_table<W: Write>(table: &ScenarioTable, format: Format, mut writer: W) -> Result<()> {
    match format {
        Format::Csv => table.write_csv(writer)?,
        Format::Json => {
            writeln!(writer, "{}", table.to_json()?)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn print_summary(name: &str, table: &ScenarioTable) {
    let finals = table.final_values();
    if finals.is_empty() {
        return;
    }
    let mean = finals.iter().sum::<f64>() / finals.len() as f64;
    let min = finals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    eprintln!(
        "{}: {} trials, final step mean={:.6} min={:.6} max={:.6}",
        name,
        table.trial_count(),
        mean,
        min,
        max
    );
}
