use crate::ExpositionError;

/// Line-level format gate run before anything is persisted: every line must
/// be non-blank and split into a `name{labels}` part and a numeric value.
/// The first violation fails the whole batch; a failure here means the
/// renderer produced garbage and must not be papered over.
pub fn validate_exposition(content: &str) -> Result<(), ExpositionError> {
    for (line_no, line) in content.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(ExpositionError::Validation {
                line_no,
                line: line.to_string(),
            });
        }

        let Some((metric, value)) = trimmed.rsplit_once(' ') else {
            return Err(ExpositionError::Validation {
                line_no,
                line: line.to_string(),
            });
        };

        if metric.is_empty() || value.parse::<f64>().is_err() {
            return Err(ExpositionError::Validation {
                line_no,
                line: line.to_string(),
            });
        }
    }

    Ok(())
}
