use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no daily snapshot files found in {}", .0.display())]
    NoSnapshots(PathBuf),
}
