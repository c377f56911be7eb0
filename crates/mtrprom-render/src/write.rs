use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::ExpositionError;

/// Durably replace `path` with `content`, or leave it untouched.
///
/// The content is written to a temp file in the destination directory (same
/// filesystem, so the rename is atomic), fsynced, renamed over the
/// destination, then opened up to 0644 for the textfile collector. Exactly
/// one trailing newline is guaranteed. Any failure removes the temp file.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), ExpositionError> {
    let mut data = content.trim_end_matches('\n').to_string();
    data.push('\n');

    let tmp_path = temp_path(path);
    if let Err(source) = write_temp(&tmp_path, data.as_bytes()) {
        let _ = fs::remove_file(&tmp_path);
        return Err(ExpositionError::Persistence {
            path: path.to_path_buf(),
            source,
        });
    }

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(ExpositionError::Persistence {
            path: path.to_path_buf(),
            source,
        });
    }

    set_collector_permissions(path);

    // Best effort: make the rename itself durable.
    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    debug!(?path, bytes = data.len(), "wrote metrics file");
    Ok(())
}

fn write_temp(tmp_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(unix)]
fn set_collector_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o644));
}

#[cfg(not(unix))]
fn set_collector_permissions(_path: &Path) {}

fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("metrics");
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let pid = std::process::id();
    let tmp_name = format!(".{}.part-{}-{}", file_name, pid, stamp);
    parent.join(tmp_name)
}
