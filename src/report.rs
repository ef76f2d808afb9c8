use anyhow::Result;
use tracing::{debug, info};

use crate::{
    snapshots::{self, SnapshotDay},
    traits::{Aggregating, ReportWrite},
    writer::Console,
};

/// Drives the day-by-day loop: load, aggregate, mirror to the console,
/// and persist the report once the whole corpus has been processed.
pub struct Engine<W, A> {
    writer: W,
    tracker: A,
    days: Vec<SnapshotDay>,
}

impl<W, A> Engine<W, A>
where
    W: ReportWrite,
    A: Aggregating,
{
    pub fn new(writer: W, tracker: A, days: Vec<SnapshotDay>) -> Self {
        Self {
            writer,
            tracker,
            days,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let names = self.tracker.names();
        let console = Console::new(names.clone());
        console.print_header();

        let mut buffer: Vec<Vec<String>> = Vec::new();
        for snapshot in &self.days {
            let records = snapshots::load_day(snapshot.path())?;
            let rows = self.tracker.observe_day(*snapshot.day(), &records);

            let mut line = vec![snapshot.day().to_string()];
            for row in &rows {
                debug!(
                    day = %row.day(),
                    location = %row.location(),
                    total_active = *row.total_active(),
                    total_confirmed = *row.total_confirmed(),
                    delta_active = *row.delta_active(),
                    delta_confirmed = *row.delta_confirmed(),
                    growth_active = *row.growth_active(),
                    growth_confirmed = *row.growth_confirmed(),
                    avg_growth_confirmed = *row.avg_growth_confirmed(),
                    last_update = ?row.last_update(),
                    "location aggregated"
                );
                line.push(format!("{:.0}", row.avg_growth_active() * 100.0));
            }
            console.print_row(&line);
            buffer.push(line);
        }

        // The report file is only touched once every day has aggregated.
        let mut header = vec!["Day".to_string()];
        header.extend(names);
        self.writer.write_record(&header)?;
        for line in &buffer {
            self.writer.write_record(line)?;
        }
        self.writer.flush()?;

        info!(days = buffer.len(), "report assembled");
        Ok(())
    }
}
