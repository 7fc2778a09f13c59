//! xsmall — smallest example for the threshold-query simulator.
//!
//! Eight vehicles, three queries, every built-in policy.  Three vehicles
//! come online after the queries are issued and one drops off early.  The
//! full Beijing fleet is loaded the same way from the matrix files; see
//! `tq-run` for scenario files.

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use log::{LevelFilter, info};
use simple_logger::SimpleLogger;

use tq_core::{EventKind, GammaLatency, QueryId, SimConfig, SimTime, VehicleId};
use tq_driver::{LatencyConfig, Scenario, run_trials};
use tq_fleet::{QuerySpec, load_fleet_readers};
use tq_output::{CsvWriter, OutputWriter, TraceObserver};
use tq_policy::PolicyKind;
use tq_sim::{ContactFate, Event, SimBuilder, SimObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:           u64   = 42;
const START_SECS:     f64   = 64_800.0; // 18:00
const TIMER_MS:       f64   = 1_000.0;
const TRIALS:         u32   = 20;

// ── Fleet CSV ─────────────────────────────────────────────────────────────────

// Work (ms) per query column; the trailing field is ignored.
const TIMES_CSV: &str = "\
car0.txt,12.0,31.5,8.2,\n\
car1.txt,14.1,29.0,9.9,\n\
car2.txt,11.7,35.2,7.5,\n\
car3.txt,25.3,60.1,15.0,\n\
car4.txt,13.0,30.8,8.8,\n\
car5.txt,12.2,33.3,8.1,\n\
car6.txt,40.5,90.0,22.4,\n\
car7.txt,12.9,32.6,9.0,\n\
";

// 1 = the vehicle satisfies the query condition.
const ANSWERS_CSV: &str = "\
car0.txt,1,0,1,\n\
car1.txt,0,1,1,\n\
car2.txt,1,0,0,\n\
car3.txt,1,1,1,\n\
car4.txt,0,0,1,\n\
car5.txt,1,1,0,\n\
car6.txt,1,0,1,\n\
car7.txt,0,1,0,\n\
";

// Connected windows in seconds of the day.  car5–car7 join after 18:00;
// car4 disconnects 20 ms after the queries are issued.
const PERIODS_CSV: &str = "\
car0.txt,0,86400,\n\
car1.txt,60000,70000,\n\
car2.txt,64000,64900,66000,70000,\n\
car3.txt,64790,65000,\n\
car4.txt,64000,64800.02,\n\
car5.txt,64800.5,70000,\n\
car6.txt,64801,64801.3,\n\
car7.txt,64802,86400,\n\
";

// ── Observer wrapper to count events ─────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:     TraceObserver<W>,
    contacts:  usize,
    aborted:   usize,
    late:      usize,
    resolved:  Vec<(QueryId, SimTime)>,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: TraceObserver<W>) -> Self {
        Self { inner, contacts: 0, aborted: 0, late: 0, resolved: Vec::new() }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_contact(&mut self, time: SimTime, query: QueryId, vehicle: VehicleId, fate: &ContactFate) {
        self.contacts += 1;
        if matches!(fate, ContactFate::Aborted { .. }) {
            self.aborted += 1;
        }
        self.inner.on_contact(time, query, vehicle, fate);
    }

    fn on_event(&mut self, event: &Event) {
        if event.kind == EventKind::LateAnswer {
            self.late += 1;
        }
        self.inner.on_event(event);
    }

    fn on_resolved(&mut self, query: QueryId, time: SimTime) {
        self.resolved.push((query, time));
        self.inner.on_resolved(query, time);
    }

    fn on_sim_end(&mut self, end: SimTime) {
        self.inner.on_sim_end(end);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    println!("=== xsmall — threshold-query simulator ===");
    println!("Vehicles: 8  |  Queries: 3  |  Seed: {SEED}");
    println!();

    // 1. Load the embedded fleet.
    let fleet = load_fleet_readers(
        Cursor::new(TIMES_CSV),
        Cursor::new(ANSWERS_CSV),
        Some(Cursor::new(PERIODS_CSV)),
    )?;
    let online = fleet
        .connectivity
        .iter()
        .filter(|c| c.is_active(SimTime::from_secs(START_SECS)))
        .count();
    println!("Fleet: {} vehicles, {online} online at 18:00", fleet.vehicle_count());

    // 2. Queries: column, threshold, payload ms.
    let queries = vec![
        QuerySpec::new(0, 3, 0.3),
        QuerySpec::new(1, 2, 7.5),
        QuerySpec::new(2, 4, 1.3),
    ];

    let config = SimConfig {
        starting_time_secs: START_SECS,
        ending_time_secs:   None,
        timer_duration_ms:  TIMER_MS,
        seed:               SEED,
    };

    // 3. One traced run of the balanced policy over 4G-like latency.
    let out_dir = Path::new("output/xsmall");
    let writer = CsvWriter::with_prefix(out_dir, "balanced_")?;
    let mut obs = CountingObserver::new(TraceObserver::new(writer));
    let t0 = Instant::now();
    let outcome = {
        let mut sim = SimBuilder::new(
            config.clone(),
            fleet.connectivity.clone(),
            queries.clone(),
            PolicyKind::balanced().build()?,
            &fleet.oracle,
        )
        .latency(GammaLatency::mobile_4g()?)
        .build()?;
        sim.run(&mut obs)?
    };
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    println!("Traced run complete in {:.3} ms", elapsed.as_secs_f64() * 1e3);
    println!("  events.csv : {} rows", obs.inner.written());
    println!("  contacts   : {} ({} aborted, {} late)", obs.contacts, obs.aborted, obs.late);
    println!();

    println!("{:<6} {:<10} {:<6} {:<6} {:<14} {:<8}", "Query", "Threshold", "Pos", "Neg", "Resolution ms", "Estimate");
    println!("{}", "-".repeat(56));
    for r in &outcome.reports {
        println!(
            "{:<6} {:<10} {:<6} {:<6} {:<14} {:<8}",
            r.query.0,
            r.threshold,
            r.positive,
            r.negative,
            r.resolution_ms,
            r.estimate.map_or_else(|| "-".to_owned(), |e| format!("{e}")),
        );
    }
    println!();

    // 4. Every policy, averaged over a few trials.
    let scenario = Scenario::new("xsmall", fleet, queries, config, LatencyConfig::default());
    println!("{:<10} {:<22} {:<12}", "Policy", "Mean max resolution", "Mean work");
    println!("{}", "-".repeat(46));
    for kind in PolicyKind::all() {
        let set = run_trials(&scenario, &kind, TRIALS)?;
        let work = set.mean().map_or(0.0, |m| m.total_work_ms);
        println!("{:<10} {:<22.2} {:<12.2}", kind.name(), set.mean_max_resolution_ms(), work);
    }
    info!("traced run written to {}", out_dir.display());

    Ok(())
}
