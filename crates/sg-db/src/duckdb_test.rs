use super::*;
use std::fs;
use tempfile::{tempdir, TempDir};

/// Write a migration directory holding the given (file name, sql) pairs
fn migrations(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, sql) in files {
        fs::write(dir.path().join(name), sql).unwrap();
    }
    dir
}

fn standard_migrations() -> TempDir {
    migrations(&[
        ("1_users.up.sql", "CREATE TABLE users (id INT);"),
        ("1_users.down.sql", "DROP TABLE users;"),
        ("2_orders.up.sql", "CREATE TABLE orders (id INT);"),
        ("2_orders.down.sql", "DROP TABLE orders;"),
        ("3_items.up.sql", "CREATE TABLE items (id INT);"),
        ("3_items.down.sql", "DROP TABLE items;"),
    ])
}

fn table_count(engine: &DuckDbEngine, name: &str) -> i64 {
    let conn = engine.conn().unwrap();
    conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = '{}'",
            name
        ),
        [],
        |row| row.get(0),
    )
    .unwrap()
}

/// Collect every item a producer emits for `[from, to)`
async fn collect(engine: &DuckDbEngine, from: u64, to: u64) -> Vec<StreamItem> {
    let (tx, mut rx) = mpsc::channel(16);
    engine.read_migrations(from, to, tx).await;

    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    items
}

#[tokio::test]
async fn test_in_memory() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();
    assert_eq!(engine.engine_type(), "duckdb");
    assert_eq!(engine.table(), DEFAULT_MIGRATIONS_TABLE);
    assert_eq!(engine.version().await.unwrap(), TrackedVersion::default());
}

#[tokio::test]
async fn test_force_sets_and_clears_version() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::new(":memory:", dir.path()).unwrap();

    engine.force(2).await.unwrap();
    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(2));

    // forcing twice is harmless
    engine.force(2).await.unwrap();
    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(2));

    engine.force(NIL_VERSION).await.unwrap();
    assert_eq!(engine.version().await.unwrap().version, None);
}

#[tokio::test]
async fn test_force_rejects_below_nil() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    assert!(matches!(
        engine.force(-2).await,
        Err(DbError::InvalidVersion(-2))
    ));
}

#[tokio::test]
async fn test_force_does_not_run_scripts() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    engine.force(3).await.unwrap();

    assert_eq!(table_count(&engine, "users"), 0);
    assert_eq!(table_count(&engine, "items"), 0);
}

#[tokio::test]
async fn test_migrate_up_from_nil() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    engine.migrate_to(2).await.unwrap();

    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(2));
    assert_eq!(table_count(&engine, "users"), 1);
    assert_eq!(table_count(&engine, "orders"), 1);
    assert_eq!(table_count(&engine, "items"), 0);
}

#[tokio::test]
async fn test_migrate_resumes_from_current() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();
    engine.migrate_to(1).await.unwrap();

    engine.migrate_to(3).await.unwrap();

    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(3));
    assert_eq!(table_count(&engine, "items"), 1);
}

#[tokio::test]
async fn test_migrate_down() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();
    engine.migrate_to(3).await.unwrap();

    engine.migrate_to(1).await.unwrap();

    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(1));
    assert_eq!(table_count(&engine, "users"), 1);
    assert_eq!(table_count(&engine, "orders"), 0);
    assert_eq!(table_count(&engine, "items"), 0);
}

#[tokio::test]
async fn test_migrate_to_current_is_noop() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();
    engine.migrate_to(2).await.unwrap();

    engine.migrate_to(2).await.unwrap();

    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(2));
}

#[tokio::test]
async fn test_migrate_unknown_target() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    assert!(matches!(
        engine.migrate_to(9).await,
        Err(DbError::MigrationNotFound(9))
    ));
}

#[tokio::test]
async fn test_failed_script_leaves_version_dirty() {
    let dir = migrations(&[
        ("1_users.up.sql", "CREATE TABLE users (id INT);"),
        ("2_broken.up.sql", "CREATE TABLE ((("),
        ("3_items.up.sql", "CREATE TABLE items (id INT);"),
    ]);
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    let err = engine.migrate_to(3).await.unwrap_err();

    assert!(matches!(err, DbError::ScriptFailed { version: 2, .. }));
    assert_eq!(engine.version().await.unwrap(), TrackedVersion::dirty(2));
    assert_eq!(table_count(&engine, "items"), 0);

    // a dirty store refuses to migrate until forced
    assert!(matches!(engine.migrate_to(3).await, Err(DbError::Dirty(2))));
}

#[tokio::test]
async fn test_oversized_version_is_rejected_before_tracking() {
    let dir = migrations(&[
        ("1_users.up.sql", "CREATE TABLE users (id INT);"),
        ("18446744073709551615_huge.up.sql", "CREATE TABLE huge (id INT);"),
    ]);
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    let err = engine.migrate_to(u64::MAX).await.unwrap_err();

    assert!(matches!(err, DbError::VersionOutOfRange(u64::MAX)));
    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(1));
    assert_eq!(table_count(&engine, "huge"), 0);
}

#[tokio::test]
async fn test_empty_script_is_noop() {
    let dir = migrations(&[("1_placeholder.up.sql", "  \n")]);
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    engine.migrate_to(1).await.unwrap();

    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(1));
}

#[tokio::test]
async fn test_latest() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();
    assert_eq!(engine.latest().unwrap(), Some(3));
}

#[tokio::test]
async fn test_custom_table_name() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path())
        .unwrap()
        .with_table("app_versions")
        .unwrap();

    engine.force(1).await.unwrap();

    assert_eq!(engine.table(), "app_versions");
    assert_eq!(table_count(&engine, "app_versions"), 1);
    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(1));
}

#[tokio::test]
async fn test_invalid_table_name() {
    let dir = standard_migrations();
    let result = DuckDbEngine::in_memory(dir.path())
        .unwrap()
        .with_table("versions; DROP TABLE x");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_version_persists_across_connections() {
    let dir = standard_migrations();
    let db_dir = tempdir().unwrap();
    let db_path = db_dir.path().join("versions.duckdb");

    {
        let engine = DuckDbEngine::from_path(&db_path, dir.path()).unwrap();
        engine.migrate_to(2).await.unwrap();
    }

    let engine = DuckDbEngine::from_path(&db_path, dir.path()).unwrap();
    assert_eq!(engine.version().await.unwrap(), TrackedVersion::clean(2));
}

#[tokio::test]
async fn test_read_migrations_half_open_range() {
    let dir = migrations(&[
        ("2_a.up.sql", ""),
        ("3_b.up.sql", ""),
        ("4_c.up.sql", ""),
        ("5_d.up.sql", ""),
        ("6_e.up.sql", ""),
    ]);
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    let versions: Vec<u64> = collect(&engine, 2, 6)
        .await
        .into_iter()
        .map(|item| match item {
            StreamItem::Migration(m) => m.version,
            other => panic!("unexpected item {other:?}"),
        })
        .collect();

    assert_eq!(versions, vec![2, 3, 4, 5]);
}

#[tokio::test]
async fn test_read_migrations_empty_range_sends_notice() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();

    let items = collect(&engine, 3, 3).await;

    assert_eq!(items, vec![StreamItem::Notice(Notice::NoChange)]);
}

#[tokio::test]
async fn test_read_migrations_missing_dir_sends_failure() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");
    fs::create_dir(&missing).unwrap();
    let engine = DuckDbEngine::in_memory(&missing).unwrap();
    fs::remove_dir(&missing).unwrap();

    let items = collect(&engine, 0, 5).await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], StreamItem::Notice(Notice::Failed(_))));
}

#[tokio::test]
async fn test_read_migrations_stops_when_receiver_dropped() {
    let dir = standard_migrations();
    let engine = DuckDbEngine::in_memory(dir.path()).unwrap();
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    // returns instead of blocking on a closed channel
    engine.read_migrations(0, 10, tx).await;
}
