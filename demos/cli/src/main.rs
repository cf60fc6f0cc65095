use std::path::PathBuf;

use anyhow::Context;
use careplan_core::{
    Clock, FixedClock, PatientId, PatientSnapshot, PatientTracker, SystemClock, TrackerConfig,
};
use careplan_json::load_chart_str;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "careplan-cli",
    about = "Summarize patient action items and follow-ups from a JSON chart bundle."
)]
struct Args {
    /// Path to the chart bundle JSON file.
    #[arg(short, long)]
    input: PathBuf,

    /// Only report on this patient. Every patient in the bundle otherwise.
    #[arg(short, long)]
    patient: Option<PatientId>,

    /// Tracker settings as a JSON file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the current day.
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Print full snapshots as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("careplan_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config {:?}", path))?;
            serde_json::from_str::<TrackerConfig>(&raw)
                .with_context(|| format!("invalid config {:?}", path))?
        }
        None => TrackerConfig::default(),
    };

    match args.today {
        Some(day) => run(&args, config, FixedClock::on(day)),
        None => {
            let clock = SystemClock::from_config(&config)?;
            run(&args, config, clock)
        }
    }
}

fn run<C: Clock>(args: &Args, config: TrackerConfig, clock: C) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("could not read chart bundle {:?}", args.input))?;
    let store = load_chart_str(&data)
        .with_context(|| format!("could not load chart bundle {:?}", args.input))?;

    let patients: Vec<PatientId> = match args.patient {
        Some(id) => vec![id],
        None => store.patients().map(|p| p.id).collect(),
    };
    info!(patients = patients.len(), input = ?args.input, "summarizing chart");

    let tracker = PatientTracker::new(store, clock).with_config(config);
    let mut snapshots = Vec::with_capacity(patients.len());
    for id in patients {
        let snapshot = tracker
            .snapshot(id)
            .with_context(|| format!("could not summarize patient {id}"))?;
        snapshots.push(snapshot);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        for snapshot in &snapshots {
            print_summary(snapshot);
        }
    }
    Ok(())
}

fn print_summary(snapshot: &PatientSnapshot) {
    println!(
        "{} ({})\n  Status: {}\n  Overdue action items: {}\n  Upcoming action items: {}\n  Completed action items: {}\n  Follow-ups: {}\n  Notes: {}",
        snapshot.patient_name,
        snapshot.patient,
        snapshot.status,
        snapshot.active_action_items.len(),
        snapshot.inactive_action_items.len(),
        snapshot.done_action_items.len(),
        snapshot.followups.len(),
        snapshot.notes.len()
    );
}
