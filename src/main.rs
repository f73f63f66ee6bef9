use replenish::io::forecast::load_forecast;
use replenish::io::reporting;
use replenish::{Experiment, ExperimentConfig, ForecastProfile, PlannerError};
use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Args {
    config: PathBuf,
    forecast: Option<PathBuf>,
    constant_demand: Option<f64>,
    dispersion: Option<f64>,
    out_dir: Option<PathBuf>,
    overrides: Vec<(String, String)>,
}

fn parse_args() -> Result<Args, PlannerError> {
    let mut config = None;
    let mut forecast = None;
    let mut constant_demand = None;
    let mut dispersion = None;
    let mut out_dir = None;
    let mut overrides = Vec::new();

    for arg in env::args().skip(1) {
        let rest = arg.strip_prefix("--").ok_or_else(|| {
            PlannerError::InvalidConfiguration(format!("unexpected argument '{}'", arg))
        })?;
        let (key, val) = rest.split_once('=').ok_or_else(|| {
            PlannerError::InvalidConfiguration(format!("expected --key=value, got '{}'", arg))
        })?;
        let number = |val: &str| {
            val.parse::<f64>().map_err(|_| {
                PlannerError::InvalidConfiguration(format!("--{} needs a number", key))
            })
        };
        match key {
            "config" => config = Some(PathBuf::from(val)),
            "forecast" => forecast = Some(PathBuf::from(val)),
            "constant-demand" => constant_demand = Some(number(val)?),
            "dispersion" => dispersion = Some(number(val)?),
            "out" => out_dir = Some(PathBuf::from(val)),
            _ => overrides.push((key.to_string(), val.to_string())),
        }
    }

    let config = config
        .ok_or_else(|| PlannerError::InvalidConfiguration("--config=PATH is required".into()))?;
    Ok(Args {
        config,
        forecast,
        constant_demand,
        dispersion,
        out_dir,
        overrides,
    })
}

fn print_usage() {
    eprintln!("replenish: service-constrained (R, Q) policy search");
    eprintln!();
    eprintln!("Usage: replenish --config=PATH (--forecast=PATH | --constant-demand=MEAN --dispersion=S) [OPTIONS]");
    eprintln!();
    eprintln!("  --config=PATH          Experiment config (JSON)");
    eprintln!("  --forecast=PATH        Forecast CSV with 'Forecast' and 'stdev' columns");
    eprintln!("  --constant-demand=MEAN Flat forecast over the configured horizon");
    eprintln!("  --dispersion=S         Relative forecast error for --constant-demand");
    eprintln!("  --out=DIR              Also write grid.csv and report.json to DIR");
    eprintln!("  --KEY=VALUE            Override a config field (e.g. --grid_runs=500)");
    eprintln!();
    eprintln!("Logging is controlled through RUST_LOG (default: info).");
}

fn load_profile(args: &Args, config: &ExperimentConfig) -> Result<ForecastProfile, PlannerError> {
    match (&args.forecast, args.constant_demand) {
        (Some(path), None) => load_forecast(path),
        (None, Some(mean)) => {
            let dispersion = args.dispersion.ok_or_else(|| {
                PlannerError::InvalidConfiguration(
                    "--constant-demand needs --dispersion".into(),
                )
            })?;
            ForecastProfile::constant(config.horizon_days, mean, dispersion)
        }
        _ => Err(PlannerError::InvalidConfiguration(
            "give exactly one of --forecast or --constant-demand".into(),
        )),
    }
}

fn write_outputs(dir: &Path, report: &replenish::ExperimentReport) -> Result<(), PlannerError> {
    fs::create_dir_all(dir)?;
    reporting::write_grid_csv(&dir.join("grid.csv"), &report.grid)?;
    reporting::write_report_json(&dir.join("report.json"), report)
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::args().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 1. SETUP CONFIGURATION
    let args = parse_args()?;
    let mut config = ExperimentConfig::from_json_file(&args.config)?;
    for (key, val) in &args.overrides {
        config.apply_override(key, val)?;
    }

    // 2. LOAD FORECAST
    let profile = load_profile(&args, &config)?;
    info!(
        days = profile.horizon(),
        average_demand = profile.average_demand(),
        dispersion = profile.dispersion(),
        "forecast loaded"
    );

    // 3. RUN EXPERIMENT
    let experiment = Experiment::new(config, profile)?;
    info!(
        baseline = %experiment.baseline_policy(),
        derived = experiment.baseline_derivation().is_some(),
        "baseline resolved"
    );
    let report = experiment.run()?;

    // 4. EXPORT RESULTS
    if let Some(dir) = &args.out_dir {
        write_outputs(dir, &report)?;
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
