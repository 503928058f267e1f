use didhub_sqlite::SqliteStore;
use didhub_test_utils::conformance::run_conformance_suite;
use uuid::Uuid;

#[tokio::test]
async fn test_sqlite_conformance() {
    let report = run_conformance_suite(|| async {
        SqliteStore::connect("sqlite::memory:")
            .await
            .expect("in-memory database")
    })
    .await;

    assert_eq!(report.failed, 0, "{report}");
    assert!(report.passed > 0);
}

/// File databases use WAL and a multi-connection pool, so concurrent checks
/// run over separate connections.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_file_conformance() {
    let dir = std::env::temp_dir().join(format!("didhub-conformance-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    let report = run_conformance_suite(|| {
        let path = dir.join(format!("{}.db", Uuid::new_v4()));

        async move {
            SqliteStore::connect(&format!("sqlite://{}", path.display()))
                .await
                .expect("file database")
        }
    })
    .await;

    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(report.failed, 0, "{report}");
    assert!(report.passed > 0);
}
