use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use getset::Getters;
use tracing::debug;

use crate::errors::ReportError;
use crate::models::{CanonicalRecord, clean_key};

/// One discovered daily snapshot file, keyed by the date in its name.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SnapshotDay {
    #[getset(get = "pub")]
    day: NaiveDate,
    #[getset(get = "pub")]
    path: PathBuf,
}

/// Lists the snapshot files in `dir`, ordered by the date encoded in their
/// `MM-DD-YYYY.csv` file names. Entries that do not match the pattern are
/// skipped, not treated as errors.
pub fn discover(dir: &Path) -> Result<Vec<SnapshotDay>> {
    let mut days = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        match day_from_filename(&path) {
            Some(day) => days.push(SnapshotDay { day, path }),
            None => debug!(path = %path.display(), "skipping non-snapshot entry"),
        }
    }

    if days.is_empty() {
        return Err(ReportError::NoSnapshots(dir.to_path_buf()))?;
    }

    days.sort_by_key(|snapshot| *snapshot.day());
    Ok(days)
}

fn day_from_filename(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(".csv")?;
    NaiveDate::parse_from_str(stem, "%m-%d-%Y").ok()
}

/// Reads one snapshot file into canonical records, preserving row order.
///
/// I/O and reader failures propagate; malformed values inside a row never
/// fail here, they degrade during normalization.
pub fn load_day(path: &Path) -> Result<Vec<CanonicalRecord>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(clean_key).collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        records.push(CanonicalRecord::from_raw(&row));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("outbreak_trends_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_filename_pattern_keys_by_date() {
        assert_eq!(
            day_from_filename(Path::new("03-15-2020.csv")),
            NaiveDate::from_ymd_opt(2020, 3, 15)
        );
        assert_eq!(day_from_filename(Path::new("notes.txt")), None);
        assert_eq!(day_from_filename(Path::new("13-45-2020.csv")), None);
        assert_eq!(day_from_filename(Path::new("README.csv")), None);
    }

    #[test]
    fn test_discover_sorts_by_day_and_skips_other_entries() {
        let dir = temp_dir("discover");
        fs::write(dir.join("02-01-2020.csv"), "Confirmed\n1\n").unwrap();
        fs::write(dir.join("01-15-2020.csv"), "Confirmed\n1\n").unwrap();
        fs::write(dir.join("notes.txt"), "scratch").unwrap();

        let days = discover(&dir).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(*days[0].day(), NaiveDate::from_ymd_opt(2020, 1, 15).unwrap());
        assert_eq!(*days[1].day(), NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_discover_without_snapshots_errors() {
        let dir = temp_dir("discover_empty");
        fs::write(dir.join("notes.txt"), "scratch").unwrap();

        assert!(discover(&dir).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_day_normalizes_rows_in_order() {
        let dir = temp_dir("load_day");
        let path = dir.join("03-15-2020.csv");
        fs::write(
            &path,
            "\u{feff}Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered\n\
             Victoria,Australia,2020-03-15T10:00:00,10,1,2\n\
             ,Italy,garbage,abc,0,0\n",
        )
        .unwrap();

        let records = load_day(&path).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].region(), "Victoria");
        assert_eq!(records[0].country(), "Australia");
        assert!(records[0].last_update().is_some());
        assert_eq!(*records[0].active(), 7);

        assert_eq!(records[1].country(), "Italy");
        assert_eq!(*records[1].last_update(), None);
        assert_eq!(*records[1].confirmed(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_day_missing_file_errors() {
        let dir = temp_dir("load_missing");
        assert!(load_day(&dir.join("01-01-2020.csv")).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
