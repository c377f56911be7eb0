use std::fs;

use mtrprom_render::{write_atomic, ExpositionError};
use tempfile::tempdir;

#[test]
fn writes_content_with_exactly_one_trailing_newline() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.prom");

    write_atomic(&path, "mtr_hop_count{target=\"a\"} 3").unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "mtr_hop_count{target=\"a\"} 3\n"
    );

    // Extra trailing newlines are collapsed, never stacked.
    write_atomic(&path, "mtr_hop_count{target=\"a\"} 3\n\n").unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "mtr_hop_count{target=\"a\"} 3\n"
    );
}

#[test]
fn replaces_existing_file_atomically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.prom");

    write_atomic(&path, "old 1").unwrap();
    write_atomic(&path, "new 2").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "new 2\n");
}

#[test]
fn failed_write_leaves_no_destination_and_no_temp() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("metrics.prom");

    let err = write_atomic(&path, "metric 1").unwrap_err();
    assert!(matches!(err, ExpositionError::Persistence { .. }));
    assert!(!path.exists());
}

#[test]
fn failed_rename_preserves_prior_state_and_cleans_temp() {
    let dir = tempdir().unwrap();
    // Destination is a directory, so the rename must fail.
    let path = dir.path().join("metrics.prom");
    fs::create_dir(&path).unwrap();
    let sentinel = path.join("keep");
    fs::write(&sentinel, b"keep").unwrap();

    let err = write_atomic(&path, "metric 1").unwrap_err();
    assert!(matches!(err, ExpositionError::Persistence { .. }));

    // Prior state intact, no temp litter.
    assert_eq!(fs::read(&sentinel).unwrap(), b"keep");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".part-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[cfg(unix)]
#[test]
fn sets_collector_readable_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.prom");
    write_atomic(&path, "metric 1").unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
