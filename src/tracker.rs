use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    models::{CanonicalRecord, DailyResultRow, LocationSpec, LocationState},
    traits::Aggregating,
};

/// Owns the rolling state of every tracked location for the whole run.
pub struct Tracker {
    specs: Vec<LocationSpec>,
    states: HashMap<String, LocationState>,
}

impl Tracker {
    pub fn new(specs: Vec<LocationSpec>) -> Self {
        Self {
            specs,
            states: HashMap::new(),
        }
    }
}

impl Aggregating for Tracker {
    fn names(&self) -> Vec<String> {
        self.specs.iter().map(|spec| spec.name().clone()).collect()
    }

    fn observe_day(&mut self, day: NaiveDate, records: &[CanonicalRecord]) -> Vec<DailyResultRow> {
        let states = &mut self.states;
        self.specs
            .iter()
            .map(|spec| {
                states
                    .entry(spec.name().clone())
                    .or_default()
                    .observe(day, spec, records)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Matcher;
    use crate::traits::ReportWrite;
    use anyhow::Result;

    struct MockReportWriter {
        records: Vec<String>,
    }

    impl MockReportWriter {
        fn new() -> Self {
            Self {
                records: Vec::new(),
            }
        }
    }

    impl ReportWrite for MockReportWriter {
        fn write_record<T: serde::Serialize>(&mut self, record: &T) -> Result<()> {
            let line = serde_json::to_string(record)?;
            self.records.push(line);
            Ok(())
        }
    }

    fn record(country: &str, region: &str, confirmed: &str) -> CanonicalRecord {
        let mut row = HashMap::new();
        row.insert("Country/Region".to_string(), country.to_string());
        row.insert("Province/State".to_string(), region.to_string());
        row.insert("Confirmed".to_string(), confirmed.to_string());
        CanonicalRecord::from_raw(&row)
    }

    fn specs() -> Vec<LocationSpec> {
        vec![
            LocationSpec::new(
                "Victoria",
                Matcher::Region {
                    country: "Australia".to_string(),
                    region: "Victoria".to_string(),
                },
                None,
            ),
            LocationSpec::new("Italy", Matcher::Country("Italy".to_string()), None),
        ]
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, n).unwrap()
    }

    #[test]
    fn test_names_follow_spec_order() {
        let tracker = Tracker::new(specs());
        assert_eq!(tracker.names(), vec!["Victoria", "Italy"]);
    }

    #[test]
    fn test_observe_day_returns_one_row_per_location() {
        let mut tracker = Tracker::new(specs());
        let rows = tracker.observe_day(day(1), &[record("Australia", "Victoria", "30")]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location(), "Victoria");
        assert_eq!(*rows[0].total_confirmed(), 30);
        assert_eq!(rows[1].location(), "Italy");
        assert_eq!(*rows[1].total_confirmed(), 0);
    }

    #[test]
    fn test_state_persists_across_days() {
        let mut tracker = Tracker::new(specs());
        tracker.observe_day(day(1), &[record("Australia", "Victoria", "50")]);
        let rows = tracker.observe_day(day(2), &[record("Australia", "Victoria", "150")]);

        assert_eq!(*rows[0].delta_confirmed(), 100);
        assert_eq!(*rows[0].growth_confirmed(), 2.0);
    }

    #[test]
    fn test_unmatched_location_carries_forward() {
        let mut tracker = Tracker::new(specs());
        tracker.observe_day(day(1), &[record("Italy", "", "200")]);
        let rows = tracker.observe_day(day(2), &[record("Australia", "Victoria", "10")]);

        let italy = &rows[1];
        assert_eq!(*italy.total_confirmed(), 200);
        assert_eq!(*italy.delta_confirmed(), 0);
        assert_eq!(*italy.growth_confirmed(), 0.0);
    }

    #[test]
    fn test_rows_export_through_report_writer() -> Result<()> {
        let mut tracker = Tracker::new(specs());
        let rows = tracker.observe_day(day(1), &[record("Italy", "", "25")]);

        let mut writer = MockReportWriter::new();
        for row in &rows {
            writer.write_record(row)?;
        }

        assert_eq!(writer.records.len(), 2);
        assert!(writer.records[1].contains("Italy"));
        Ok(())
    }
}
