//! `tq-run` — run the experiment described by a scenario file.
//!
//! ```text
//! tq-run <scenario.yaml> [--seed N] [--trials N] [--verbose]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::{LevelFilter, info};
use simple_logger::SimpleLogger;
use tq_driver::{Scenario, ScenarioFile, execute};

const USAGE: &str = "usage: tq-run <scenario.yaml> [--seed N] [--trials N] [--verbose]";

struct Args {
    scenario: PathBuf,
    seed:     Option<u64>,
    trials:   Option<u32>,
    verbose:  bool,
}

fn parse_args() -> Result<Args> {
    let mut scenario = None;
    let mut seed = None;
    let mut trials = None;
    let mut verbose = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let v = args.next().context("--seed needs a value")?;
                seed = Some(parse_seed(&v)?);
            }
            "--trials" => {
                let v = args.next().context("--trials needs a value")?;
                trials = Some(v.parse().with_context(|| format!("bad --trials value {v:?}"))?);
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            s if s.starts_with('-') => bail!("unknown option {s}\n{USAGE}"),
            s => {
                if scenario.replace(PathBuf::from(s)).is_some() {
                    bail!("more than one scenario file given\n{USAGE}");
                }
            }
        }
    }

    let Some(scenario) = scenario else {
        bail!("{USAGE}");
    };
    Ok(Args { scenario, seed, trials, verbose })
}

/// Decimal, or hex with a `0x` prefix.
fn parse_seed(s: &str) -> Result<u64> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.with_context(|| format!("bad --seed value {s:?}"))
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let level = if args.verbose { LevelFilter::Trace } else { LevelFilter::Info };
    SimpleLogger::new().with_level(level).init()?;

    let mut file = ScenarioFile::load(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))?;
    if let Some(seed) = args.seed {
        file.sim.seed = seed;
    }
    if let Some(trials) = args.trials {
        if trials == 0 {
            bail!("--trials must be at least 1");
        }
        file.trials = trials;
    }

    let scenario = Scenario::from_file(&file)?;
    info!(
        "{}: {} vehicles, {} queries, seed {}",
        scenario.name,
        scenario.vehicle_count(),
        scenario.queries.len(),
        file.sim.seed
    );

    execute(&file, &scenario)?;
    info!("results written to {}", file.output_dir.display());
    Ok(())
}
