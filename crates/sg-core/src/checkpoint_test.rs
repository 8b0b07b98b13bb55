use super::*;
use tempfile::tempdir;

#[test]
fn test_write_then_read() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());

    store.write(17).unwrap();

    assert!(store.exists());
    assert_eq!(store.read().unwrap(), 17);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "17");
}

#[test]
fn test_write_overwrites_previous_value() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());

    store.write(100).unwrap();
    store.write(4).unwrap();

    assert_eq!(store.read().unwrap(), 4);
}

#[test]
fn test_read_trims_whitespace() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    fs::write(store.path(), "  42\n").unwrap();

    assert_eq!(store.read().unwrap(), 42);
}

#[test]
fn test_read_missing_is_not_found() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());

    let err = store.read().unwrap_err();

    assert!(err.is_not_found());
    assert!(!store.exists());
}

#[test]
fn test_read_corrupt_content() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    fs::write(store.path(), "not-a-version").unwrap();

    let err = store.read().unwrap_err();

    assert!(!err.is_not_found());
    match err {
        CoreError::CheckpointCorrupt { content, .. } => assert_eq!(content, "not-a-version"),
        other => panic!("expected CheckpointCorrupt, got {other:?}"),
    }
}

#[test]
fn test_signed_or_oversized_values_are_corrupt() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());

    for content in ["+7", "-2", "- 1", "9223372036854775808", ""] {
        fs::write(store.path(), content).unwrap();
        match store.read() {
            Err(CoreError::CheckpointCorrupt { content: seen, .. }) => {
                assert_eq!(seen, content.trim())
            }
            other => panic!("{content:?} should be corrupt, got {other:?}"),
        }
    }
}

#[test]
fn test_nil_round_trip() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());

    store.write(NIL_VERSION).unwrap();

    assert_eq!(fs::read_to_string(store.path()).unwrap(), "-1");
    assert_eq!(store.read().unwrap(), NIL_VERSION);
}

#[test]
fn test_largest_version_is_accepted() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    fs::write(store.path(), i64::MAX.to_string()).unwrap();

    assert_eq!(store.read().unwrap(), i64::MAX);
}

#[test]
fn test_clear_removes_file() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    store.write(3).unwrap();

    store.clear().unwrap();

    assert!(!store.exists());
    assert!(store.read().unwrap_err().is_not_found());
}

#[test]
fn test_clear_missing_is_not_found() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());

    assert!(store.clear().unwrap_err().is_not_found());
}

#[test]
fn test_path_uses_well_known_name() {
    let store = CheckpointStore::in_dir(Path::new("/srv/migrations"));
    assert_eq!(
        store.path(),
        Path::new("/srv/migrations").join(CHECKPOINT_FILE_NAME)
    );
}

#[cfg(unix)]
#[test]
fn test_checkpoint_mode_is_0644() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    store.write(9).unwrap();

    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
