use anyhow::{Result, anyhow};
use std::env;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod errors;
mod models;
mod report;
mod snapshots;
mod tracker;
mod traits;
mod writer;

const DEFAULT_INPUT_DIR: &str = "COVID-19/csse_covid_19_data/csse_covid_19_daily_reports";
const OUTPUT_PATH: &str = "output.csv";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let input_dir = match args.len() {
        0 | 1 => DEFAULT_INPUT_DIR,
        2 => args[1].as_str(),
        _ => Err(anyhow!("not implemented"))?,
    };

    let locations = models::default_locations();
    for location in &locations {
        info!(location = %location.name(), population = ?location.population(), "tracking");
    }

    let days = snapshots::discover(Path::new(input_dir))?;
    info!(files = days.len(), input_dir, "snapshot files discovered");

    let writer = writer::FileReportWriter::new(OUTPUT_PATH);
    let tracker = tracker::Tracker::new(locations);
    let mut engine = report::Engine::new(writer, tracker, days);

    engine.run()?;

    Ok(())
}
