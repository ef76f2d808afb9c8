use std::fs::File;
use std::path::PathBuf;

use anyhow::Result;
use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::traits::ReportWrite;

const DAY_WIDTH: usize = 10;
const VALUE_WIDTH: usize = 10;

/// Writes the assembled report to a CSV file, replacing any previous report
/// in full. The destination is opened on the first write, so a run that
/// fails before producing rows leaves the previous report untouched.
pub struct FileReportWriter {
    path: PathBuf,
    inner: Option<Writer<File>>,
}

impl FileReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileReportWriter {
            path: path.into(),
            inner: None,
        }
    }
}

impl ReportWrite for FileReportWriter {
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        if self.inner.is_none() {
            let file = File::create(&self.path)?;
            self.inner = Some(WriterBuilder::new().from_writer(file));
        }
        if let Some(writer) = self.inner.as_mut() {
            writer.serialize(record)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.inner.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Mirrors report rows to stdout as column-aligned lines.
pub struct Console {
    names: Vec<String>,
    widths: Vec<usize>,
}

impl Console {
    pub fn new(names: Vec<String>) -> Self {
        let widths = names.iter().map(|name| name.len().max(VALUE_WIDTH)).collect();
        Console { names, widths }
    }

    pub fn print_header(&self) {
        println!("{}", self.header_line());
    }

    /// Prints one report row; `cells[0]` is the day, the rest line up under
    /// the location columns.
    pub fn print_row(&self, cells: &[String]) {
        println!("{}", self.row_line(cells));
    }

    fn header_line(&self) -> String {
        let mut line = format!("{:<width$}", "Day", width = DAY_WIDTH);
        for (name, width) in self.names.iter().zip(self.widths.iter().copied()) {
            line.push_str(&format!("  {name:>width$}"));
        }
        line
    }

    fn row_line(&self, cells: &[String]) -> String {
        let mut parts = cells.iter();
        let day = parts.next().map(String::as_str).unwrap_or("");
        let mut line = format!("{day:<width$}", width = DAY_WIDTH);
        for (value, width) in parts.zip(self.widths.iter().copied()) {
            line.push_str(&format!("  {value:>width$}"));
        }
        line
    }
}
