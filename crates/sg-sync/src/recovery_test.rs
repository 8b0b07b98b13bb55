use super::*;
use crate::test_utils::FakeEngine;
use sg_db::TrackedVersion;
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn test_recover_forces_checkpoint_and_deletes_it() {
    let dir = tempdir().unwrap();
    CheckpointStore::in_dir(dir.path()).write(7).unwrap();
    let engine = Arc::new(FakeEngine::new(1..=10).with_tracked(TrackedVersion::dirty(8)));
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    let version = recovery.recover().await.unwrap();

    assert_eq!(version, 7);
    assert_eq!(engine.forced(), vec![7]);
    assert_eq!(engine.tracked(), TrackedVersion::clean(7));
    let store = recovery.checkpoint().unwrap();
    assert!(store.read().unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_recover_without_checkpoint_is_not_found() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(FakeEngine::new(1..=3));
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    let err = recovery.recover().await.unwrap_err();

    assert!(err.is_not_found());
    assert!(engine.forced().is_empty());
}

#[tokio::test]
async fn test_recover_runs_once() {
    let dir = tempdir().unwrap();
    CheckpointStore::in_dir(dir.path()).write(2).unwrap();
    let engine = Arc::new(FakeEngine::new(1..=3));
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    recovery.recover().await.unwrap();
    let second = recovery.recover().await.unwrap_err();

    assert!(second.is_not_found());
    assert_eq!(engine.forced(), vec![2]);
}

#[tokio::test]
async fn test_recover_without_destination_is_not_found() {
    let engine = Arc::new(FakeEngine::new(1..=3));
    let recovery = Recovery::new(engine.clone(), None, 10).unwrap();

    let err = recovery.recover().await.unwrap_err();

    assert!(err.is_not_found());
    assert!(engine.forced().is_empty());
}

#[tokio::test]
async fn test_recover_corrupt_checkpoint() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    fs::write(store.path(), "v12").unwrap();
    let engine = Arc::new(FakeEngine::new(1..=3));
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    let err = recovery.recover().await.unwrap_err();

    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        SyncError::Core(CoreError::CheckpointCorrupt { .. })
    ));
    assert!(engine.forced().is_empty());
    // left in place for the operator to inspect
    assert!(store.exists());
}

#[tokio::test]
async fn test_recover_force_failure_keeps_checkpoint() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    store.write(5).unwrap();
    let engine = Arc::new(FakeEngine::new(1..=9).failing_force());
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    let err = recovery.recover().await.unwrap_err();

    assert!(matches!(err, SyncError::Force { version: 5, .. }));
    assert!(store.exists());
}

#[tokio::test]
async fn test_recover_out_of_range_version() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    fs::write(store.path(), u64::MAX.to_string()).unwrap();
    let engine = Arc::new(FakeEngine::new(1..=3));
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    let err = recovery.recover().await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Core(CoreError::CheckpointCorrupt { .. })
    ));
    assert!(engine.forced().is_empty());
    assert!(store.exists());
}

#[tokio::test]
async fn test_recover_signed_checkpoint_is_corrupt() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::in_dir(dir.path());
    fs::write(store.path(), "+7").unwrap();
    let engine = Arc::new(FakeEngine::new(1..=9));
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    let err = recovery.recover().await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Core(CoreError::CheckpointCorrupt { .. })
    ));
    assert!(engine.forced().is_empty());
}

#[tokio::test]
async fn test_recover_nil_checkpoint_clears_version() {
    let dir = tempdir().unwrap();
    CheckpointStore::in_dir(dir.path())
        .write(sg_core::NIL_VERSION)
        .unwrap();
    let engine = Arc::new(FakeEngine::new([0, 1]).with_tracked(TrackedVersion::dirty(0)));
    let recovery = Recovery::new(engine.clone(), Some(dir.path().to_path_buf()), 10).unwrap();

    let version = recovery.recover().await.unwrap();

    assert_eq!(version, sg_core::NIL_VERSION);
    assert_eq!(engine.forced(), vec![sg_core::NIL_VERSION]);
    assert_eq!(engine.tracked(), TrackedVersion::default());
}

#[test]
fn test_new_rejects_zero_prefetch() {
    let engine = Arc::new(FakeEngine::new([1]));
    assert!(matches!(
        Recovery::new(engine, None, 0),
        Err(SyncError::InvalidPrefetch(0))
    ));
}
