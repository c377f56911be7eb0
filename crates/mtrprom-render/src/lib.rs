//! Prometheus exposition rendering and durable persistence.

pub mod render;
pub mod sanitize;
pub mod validate;
pub mod write;

use std::path::PathBuf;

use thiserror::Error;

pub use render::render_report;
pub use sanitize::sanitize_label_value;
pub use validate::validate_exposition;
pub use write::write_atomic;

#[derive(Debug, Error)]
pub enum ExpositionError {
    /// Rendered text failed the line-level format gate. This signals a
    /// rendering defect; nothing is written.
    #[error("invalid exposition line {line_no}: {line:?}")]
    Validation { line_no: usize, line: String },

    /// Temp-file write, fsync, or rename failed; the destination is left at
    /// its prior state.
    #[error("failed to persist metrics to {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
