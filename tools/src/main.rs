//! afi-runner: headless AFI / IPM simulation runner.
//!
//! Usage:
//!   afi-runner --data-dir ./data --region "Kota Bandung" --set atms=900
//!   afi-runner --data-dir ./data --db afi.db --export-matrix matrix.json
//!   afi-runner --data-dir ./data --db afi.db --snapshot latest --region "Kota Bandung"
//!   afi-runner --synthetic 40 --seed 7 --ipc-mode

use afi_core::{
    config::AfiConfig,
    error::AfiError,
    pipeline::TrainingPipeline,
    predictor::{LinearPredictor, Predictor},
    record::{RawField, RecordEdits, RegionObservation},
    session::{SimulationOutcome, SimulationSession},
    store::AfiStore,
    synthetic,
    types::{SnapshotId, Year},
};
use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    ListRegions {
        #[serde(default)]
        year: Option<Year>,
    },
    GetReference,
    Defaults {
        region: String,
        #[serde(default)]
        year:   Option<Year>,
    },
    Simulate {
        region: String,
        #[serde(default)]
        year:   Option<Year>,
        #[serde(default)]
        edits:  RecordEdits,
    },
    Quit,
}

struct Runner {
    session:     SimulationSession,
    store:       AfiStore,
    snapshot_id: SnapshotId,
    year:        Year,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = flag(&args, "--data-dir").unwrap_or("./data");
    let db = flag(&args, "--db").unwrap_or(":memory:");
    let synthetic_regions = parse_arg(&args, "--synthetic", 0usize);
    let seed = parse_arg(&args, "--seed", 42u64);

    let config = AfiConfig::load(data_dir)?;
    let year = parse_arg(&args, "--year", config.simulation_year);

    let observations: Vec<RegionObservation> = if synthetic_regions > 0 {
        synthetic::generate(seed, synthetic_regions, &[year - 1, year])
    } else {
        config.load_observations(data_dir)?
    };

    if !ipc_mode {
        println!("AFI / IPM simulation — afi-runner");
        println!("  data_dir:     {data_dir}");
        println!("  db:           {db}");
        println!("  year:         {year}");
        println!("  statistics:   {:?}", config.statistics);
        println!("  observations: {}", observations.len());
    }

    let store = AfiStore::open(db)?;
    store.migrate()?;
    store.import_observations(&observations)?;
    let observations = store.observations(None)?;

    // One reference for the whole run: matrix export and every simulation use it.
    // `--snapshot` reuses a frozen one instead of re-deriving it from the table.
    let (snapshot_id, reference) = match flag(&args, "--snapshot") {
        Some(selector) => {
            let (id, stats) = store.frozen_reference(selector)?;
            (id, Arc::new(stats))
        }
        None => {
            let stats = Arc::new(config.statistics.provide(&observations)?);
            (store.save_reference_snapshot(&stats)?, stats)
        }
    };
    if !ipc_mode {
        println!("  snapshot:     {snapshot_id}");
        println!();
    }

    if let Some(path) = flag(&args, "--export-matrix") {
        let set = TrainingPipeline::new(observations.clone(), config.statistics.clone())
            .build_with(Arc::clone(&reference))?;
        let export = serde_json::json!({
            "snapshot_id": snapshot_id,
            "reference":   reference.as_ref(),
            "matrix":      set.matrix,
            "targets":     set.targets,
            "excluded":    set.excluded,
        });
        std::fs::write(path, serde_json::to_string_pretty(&export)?)?;
        if !ipc_mode {
            println!(
                "exported {} training rows ({} excluded) to {path}",
                set.targets.len(),
                set.excluded.len()
            );
        }
    }

    let model_path = config.model_path(data_dir);
    let predictor: Arc<dyn Predictor> = Arc::new(LinearPredictor::load(&model_path)?);
    let session = SimulationSession::new(observations, reference, predictor)?;

    let runner = Runner { session, store, snapshot_id, year };

    if ipc_mode {
        run_ipc_loop(&runner)?;
    } else {
        let edits = parse_edits(&args)?;
        let region = match flag(&args, "--region") {
            Some(r) => r.to_string(),
            None => runner
                .session
                .regions(year)
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("no regions for year {year}"))?,
        };
        let outcome = runner.simulate(&region, year, &edits)?;
        print_summary(&outcome, &edits);
    }

    Ok(())
}

impl Runner {
    fn simulate(&self, region: &str, year: Year, edits: &RecordEdits) -> Result<SimulationOutcome, AfiError> {
        let outcome = self.session.simulate(region, year, edits)?;
        self.store.log_simulation(Some(&self.snapshot_id), edits, &outcome)?;
        Ok(outcome)
    }

    fn handle(&self, cmd: IpcCommand) -> Result<serde_json::Value, AfiError> {
        let value = match cmd {
            IpcCommand::ListRegions { year } => {
                let year = year.unwrap_or(self.year);
                serde_json::json!({ "year": year, "regions": self.session.regions(year) })
            }
            IpcCommand::GetReference => serde_json::json!({
                "snapshot_id": self.snapshot_id,
                "reference":   self.session.reference().as_ref(),
            }),
            IpcCommand::Defaults { region, year } => {
                let year = year.unwrap_or(self.year);
                let record = self.session.defaults(&region, year)?;
                serde_json::json!({ "region": region, "year": year, "record": record })
            }
            IpcCommand::Simulate { region, year, edits } => {
                let outcome = self.simulate(&region, year.unwrap_or(self.year), &edits)?;
                serde_json::to_value(outcome)?
            }
            IpcCommand::Quit => serde_json::Value::Null,
        };
        Ok(value)
    }
}

fn run_ipc_loop(runner: &Runner) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        // Domain errors abort only this request, and are reported as errors,
        // never as a zero-valued result.
        let reply = match runner.handle(cmd) {
            Ok(v) => serde_json::json!({ "ok": v }),
            Err(e) => {
                log::warn!("request failed: {e}");
                serde_json::json!({ "error": e.to_string() })
            }
        };
        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(outcome: &SimulationOutcome, edits: &RecordEdits) {
    println!("=== SIMULATION ===");
    println!("  region:    {}", outcome.region);
    println!("  year:      {}", outcome.year);
    if edits.is_empty() {
        println!("  edits:     (none)");
    } else {
        for (field, value) in &edits.values {
            println!("  edit:      {} = {value}", field.column_name());
        }
    }
    println!();
    println!("=== INDEX ===");
    println!("  D1 = {:.4} | D2 = {:.4} | D3 = {:.4}", outcome.d1, outcome.d2, outcome.d3);
    println!("  AFI = {:.4}", outcome.afi);
    println!();
    println!("=== PREDICTION ===");
    println!("  predicted IPM: {:.2}", outcome.predicted_ipm);
    println!("  baseline IPM:  {:.2}", outcome.baseline_ipm);
    println!("  deviation:     {:+.2}", outcome.deviation);
}

/// Collect every `--set field=value` pair.
fn parse_edits(args: &[String]) -> Result<RecordEdits> {
    let mut edits = RecordEdits::new();
    for w in args.windows(2).filter(|w| w[0] == "--set") {
        let (name, value) = w[1]
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("--set expects field=value, got '{}'", w[1]))?;
        let field = RawField::parse(name)
            .ok_or_else(|| anyhow::anyhow!("unknown field '{name}'"))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {name}: {e}"))?;
        edits = edits.set(field, value);
    }
    Ok(edits)
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
