//! Import batches persisted through SQLite

mod common;

use common::{owner, reference_targets};
use notelink::{
    collect_files, DocumentStore, ImportConfig, ImportCoordinator, OpenStore, OwnerId, RawFile,
    SqliteStore,
};
use std::sync::Arc;

#[tokio::test]
async fn import_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("notes.db");
    let files = vec![
        RawFile::new("A.md", "See [[B]] and [[C|see also]]."),
        RawFile::new("B.md", "- [ ] todo\n- [x] done\n"),
    ];

    let (b_id, c_id) = {
        let store = Arc::new(SqliteStore::open(&db).unwrap());
        let report = ImportCoordinator::new(store)
            .import_for_owner(&files, &owner())
            .await
            .unwrap();
        assert_eq!(report.placeholders_created, 2);
        assert_eq!(report.committed, 3);
        let targets = reference_targets(report.document("A").unwrap().content.as_ref().unwrap());
        (targets[0].1.clone().unwrap(), targets[1].1.clone().unwrap())
    };

    let store = Arc::new(SqliteStore::open(&db).unwrap());
    let listed = store.list_documents(&owner()).await.unwrap();
    assert_eq!(listed.len(), 3);

    let b = listed.iter().find(|d| d.title == "B").unwrap();
    assert_eq!(b.id, b_id);
    assert!(!b.is_placeholder());
    let c = listed.iter().find(|d| d.title == "C").unwrap();
    assert_eq!(c.id, c_id);
    assert!(c.is_placeholder());

    // Second run against the reopened store allocates nothing new
    let report = ImportCoordinator::new(store.clone())
        .import_for_owner(&files, &owner())
        .await
        .unwrap();
    assert!(report.placeholders.is_empty());
    assert_eq!(report.committed, 2);
    assert_eq!(store.list_documents(&owner()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn owners_are_isolated() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let coordinator = ImportCoordinator::new(store.clone());
    let files = vec![RawFile::new("A.md", "[[Shared]]")];

    let alice = coordinator
        .import_for_owner(&files, &OwnerId::new("alice"))
        .await
        .unwrap();
    let bob = coordinator
        .import_for_owner(&files, &OwnerId::new("bob"))
        .await
        .unwrap();

    assert_eq!(alice.placeholders_created, 1);
    assert_eq!(bob.placeholders_created, 1);
    assert_ne!(alice.placeholders[0].id, bob.placeholders[0].id);
    assert_eq!(store.list_documents(&OwnerId::new("alice")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn directory_intake_feeds_the_coordinator() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Index.md"), "# Index\n\n[[Daily]]\n").unwrap();
    std::fs::write(dir.path().join("Daily.markdown"), "today").unwrap();
    std::fs::write(dir.path().join("photo.png"), [0u8, 1, 2]).unwrap();

    let config = ImportConfig::default();
    let files = collect_files(&[dir.path().to_path_buf()], &config).unwrap();
    assert_eq!(files.len(), 2);

    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let report = ImportCoordinator::new(store)
        .with_config(&config)
        .import_for_owner(&files, &owner())
        .await
        .unwrap();

    // Daily is referenced before it exists, so its content lands on the placeholder
    assert_eq!(report.placeholders_created, 1);
    assert_eq!(report.committed, 2);
    let daily = report.document("Daily").unwrap();
    let targets = reference_targets(report.document("Index").unwrap().content.as_ref().unwrap());
    assert_eq!(daily.id, report.placeholders[0].id);
    assert_eq!(targets, vec![("Daily".to_string(), Some(daily.id.clone()))]);
}
