use std::collections::{HashMap, VecDeque};

use chrono::{NaiveDate, NaiveDateTime};
use getset::Getters;
use serde::Serialize;

/// Number of growth samples kept in a location's sliding window.
const WINDOW_CAPACITY: usize = 5;

/// Previous-total floor at or below which a growth ratio is reported as zero.
const NOISE_GUARD: i64 = 20;

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%y %H:%M:%S",
];

/// Strips the first character outside `[A-Za-z/. \-_0-9]` from a header key.
///
/// Some snapshot files in the corpus carry corrupted header bytes (a BOM or
/// a stray control character); the cleanup is intentionally this narrow.
pub fn clean_key(key: &str) -> String {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | ' ' | '-' | '_');
    match key.chars().position(|c| !allowed(c)) {
        Some(idx) => {
            let mut cleaned: String = key.chars().take(idx).collect();
            cleaned.extend(key.chars().skip(idx + 1));
            cleaned
        }
        None => key.to_string(),
    }
}

fn parse_count(value: Option<&str>) -> i64 {
    let Some(text) = value else { return 0 };
    let text = text.trim();
    if let Ok(count) = text.parse::<i64>() {
        return count;
    }
    match text.parse::<f64>() {
        Ok(count) if count.is_finite() => count as i64,
        _ => 0,
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn field<'a>(row: &'a HashMap<String, String>, candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|name| {
        row.get(*name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    })
}

/// One normalized snapshot row.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CanonicalRecord {
    #[getset(get = "pub")]
    last_update: Option<NaiveDateTime>,
    #[getset(get = "pub")]
    country: String,
    #[getset(get = "pub")]
    region: String,
    #[getset(get = "pub")]
    confirmed: i64,
    #[getset(get = "pub")]
    deaths: i64,
    #[getset(get = "pub")]
    recovered: i64,
    #[getset(get = "pub")]
    active: i64,
}

impl CanonicalRecord {
    /// Builds a canonical record from one raw CSV row.
    ///
    /// # Arguments
    /// * `row` - Raw header-to-value mapping, header keys already cleaned.
    ///
    /// # Returns
    /// A canonical record. Normalization is total: unparseable counts become
    /// zero and an unparseable timestamp becomes absent, never an error.
    pub fn from_raw(row: &HashMap<String, String>) -> Self {
        let last_update = field(row, &["Last Update", "Last_Update"]).and_then(parse_timestamp);
        let country = field(row, &["Country/Region", "Country_Region"])
            .unwrap_or_default()
            .to_string();
        let region = field(row, &["Province/State", "Province_State"])
            .unwrap_or_default()
            .to_string();
        let confirmed = parse_count(field(row, &["Confirmed"]));
        let deaths = parse_count(field(row, &["Deaths"]));
        let recovered = parse_count(field(row, &["Recovered"]));

        // Always derived; a provided `Active` column is never trusted.
        let active = confirmed - deaths - recovered;

        CanonicalRecord {
            last_update,
            country,
            region,
            confirmed,
            deaths,
            recovered,
            active,
        }
    }
}

/// Membership test for a named geographic aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Country(String),
    Region { country: String, region: String },
}

impl Matcher {
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        match self {
            Matcher::Country(country) => record.country() == country,
            Matcher::Region { country, region } => {
                record.country() == country && record.region() == region
            }
        }
    }
}

#[derive(Debug, Clone, Getters)]
pub struct LocationSpec {
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    matcher: Matcher,
    #[getset(get = "pub")]
    population: Option<u64>,
}

impl LocationSpec {
    pub fn new(name: impl Into<String>, matcher: Matcher, population: Option<u64>) -> Self {
        LocationSpec {
            name: name.into(),
            matcher,
            population,
        }
    }
}

/// The fixed, ordered list of tracked locations.
pub fn default_locations() -> Vec<LocationSpec> {
    vec![
        LocationSpec::new(
            "Victoria",
            Matcher::Region {
                country: "Australia".to_string(),
                region: "Victoria".to_string(),
            },
            Some(6_681_000),
        ),
        LocationSpec::new(
            "Australia",
            Matcher::Country("Australia".to_string()),
            Some(25_687_000),
        ),
        LocationSpec::new("Italy", Matcher::Country("Italy".to_string()), Some(59_641_000)),
        LocationSpec::new("US", Matcher::Country("US".to_string()), Some(331_893_000)),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GrowthSample {
    active: f64,
    confirmed: f64,
}

/// Rolling per-location aggregation state, mutated once per processed day.
#[derive(Debug, Default)]
pub struct LocationState {
    previous_active: i64,
    previous_confirmed: i64,
    window: VecDeque<GrowthSample>,
    last_update: Option<NaiveDateTime>,
}

impl LocationState {
    /// Folds one day's records into this location's rolling state.
    ///
    /// # Arguments
    /// * `day` - The snapshot date being processed.
    /// * `spec` - The location whose matcher selects the relevant records.
    /// * `records` - The full day's canonical records, in source order.
    ///
    /// # Returns
    /// The result row for this location and day. A day with no matching
    /// records carries the previous totals forward and contributes a
    /// zero-growth sample to the window.
    pub fn observe(
        &mut self,
        day: NaiveDate,
        spec: &LocationSpec,
        records: &[CanonicalRecord],
    ) -> DailyResultRow {
        let mut total_active = 0i64;
        let mut total_confirmed = 0i64;
        let mut matched_any = false;

        for record in records.iter().filter(|r| spec.matcher().matches(r)) {
            matched_any = true;
            total_active += *record.active();
            total_confirmed += *record.confirmed();
            // Last record in file order wins, whether or not that is the
            // chronologically latest entry within the day.
            if record.last_update().is_some() {
                self.last_update = *record.last_update();
            }
        }

        if !matched_any {
            total_active = self.previous_active;
            total_confirmed = self.previous_confirmed;
        }

        let delta_active = total_active - self.previous_active;
        let delta_confirmed = total_confirmed - self.previous_confirmed;
        let growth_active = growth_ratio(delta_active, self.previous_active);
        let growth_confirmed = growth_ratio(delta_confirmed, self.previous_confirmed);

        self.window.push_back(GrowthSample {
            active: growth_active,
            confirmed: growth_confirmed,
        });
        if self.window.len() > WINDOW_CAPACITY {
            self.window.pop_front();
        }
        let avg_growth_active = window_mean(self.window.iter().map(|s| s.active));
        let avg_growth_confirmed = window_mean(self.window.iter().map(|s| s.confirmed));

        self.previous_active = total_active;
        self.previous_confirmed = total_confirmed;

        DailyResultRow {
            day,
            location: spec.name().clone(),
            total_active,
            total_confirmed,
            delta_active,
            delta_confirmed,
            growth_active,
            growth_confirmed,
            avg_growth_active,
            avg_growth_confirmed,
            last_update: self.last_update,
        }
    }
}

fn growth_ratio(delta: i64, previous: i64) -> f64 {
    if previous > NOISE_GUARD {
        delta as f64 / previous as f64
    } else {
        0.0
    }
}

fn window_mean(samples: impl Iterator<Item = f64>) -> f64 {
    let (count, sum) = samples.fold((0usize, 0.0), |(count, sum), v| (count + 1, sum + v));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// One location's computed result for one processed day.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct DailyResultRow {
    #[getset(get = "pub")]
    day: NaiveDate,
    #[getset(get = "pub")]
    location: String,
    #[getset(get = "pub")]
    total_active: i64,
    #[getset(get = "pub")]
    total_confirmed: i64,
    #[getset(get = "pub")]
    delta_active: i64,
    #[getset(get = "pub")]
    delta_confirmed: i64,
    #[getset(get = "pub")]
    growth_active: f64,
    #[getset(get = "pub")]
    growth_confirmed: f64,
    #[getset(get = "pub")]
    avg_growth_active: f64,
    #[getset(get = "pub")]
    avg_growth_confirmed: f64,
    #[getset(get = "pub")]
    last_update: Option<NaiveDateTime>,
}
