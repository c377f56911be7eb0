/// Make a label value safe for the exposition format. Scrapers choke on
/// quotes, control characters, and stray whitespace inside label values, so
/// only alphanumerics plus `- _ . : /` survive.
///
/// When a hop index is supplied, the `???` non-responder sentinel becomes
/// `hop_<index>_silent`, and an empty result falls back to `hop_<index>`.
/// Idempotent: sanitizing sanitized output is a no-op.
pub fn sanitize_label_value(value: &str, hop: Option<u32>) -> String {
    let value = match hop {
        Some(index) => value.replace("???", &format!("hop_{index}_silent")),
        None => value.to_string(),
    };

    let cleaned: String = value
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_alphanumeric() || "-_.:/".contains(c) => Some(c),
            _ => None,
        })
        .collect();

    if cleaned.is_empty() {
        if let Some(index) = hop {
            return format!("hop_{index}");
        }
    }

    cleaned
}
