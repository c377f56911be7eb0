//! MTR report decoding and path-health analysis.

pub mod health;
pub mod parser;

use thiserror::Error;

pub use health::{summarize, summarize_with, HealthWeights};
pub use parser::{parse_report, ParsedReport, SourceFormat};

#[derive(Debug, Error)]
pub enum ParseError {
    /// Neither the structured nor the textual decode produced a single hop.
    #[error("no hops found in report output")]
    NoHopsFound,
}
