use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{CanonicalRecord, DailyResultRow};

/// ReportWrite trait provides a method to write one record of the report.
pub trait ReportWrite {
    /// Writes a record to the report.
    ///
    /// # Arguments
    /// * `record` - The record to write, serializable as one CSV row.
    ///
    /// # Returns
    /// A Result indicating success or failure.
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()>;

    /// Flushes any buffered output to the destination.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Aggregating trait provides per-location day-over-day aggregation.
pub trait Aggregating {
    /// Display names of the tracked locations, in report column order.
    fn names(&self) -> Vec<String>;

    /// Folds one day's records into every tracked location's rolling state.
    ///
    /// # Arguments
    /// * `day` - The snapshot date being processed.
    /// * `records` - The day's canonical records, in source order.
    ///
    /// # Returns
    /// One result row per tracked location, in report column order.
    fn observe_day(&mut self, day: NaiveDate, records: &[CanonicalRecord]) -> Vec<DailyResultRow>;
}
