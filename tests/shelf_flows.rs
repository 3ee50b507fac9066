use jsonshelf::files::form::FileFieldError;
use jsonshelf::files::persist::{decode_snapshot, encode_snapshot};
use jsonshelf::files::{
    request_delete, selectors, Action, AutoConfirm, FilesState, InMemoryFile, JsonFileStorage,
    PersistenceSync, SqliteStorage, Storage, Store, StoredFile, UploadError, UploadFlow,
    UploadForm, UploadSimulator, ValidationRules, DEFAULT_STORAGE_KEY,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;

fn simulator() -> UploadSimulator {
    UploadSimulator::new(10, Duration::from_millis(1))
}

fn flow() -> UploadFlow {
    UploadFlow::new(ValidationRules::new("demo"), simulator())
}

fn stored(name: &str) -> StoredFile {
    StoredFile {
        file_name: name.into(),
        title: "n-42c-demo".into(),
        description: "plain".into(),
        valid: true,
        content: "{}".into(),
    }
}

fn json_store(dir: &std::path::Path) -> (Arc<JsonFileStorage>, Store) {
    let storage = Arc::new(JsonFileStorage::new(dir.to_str().unwrap()).unwrap());
    let store = PersistenceSync::new(storage.clone(), DEFAULT_STORAGE_KEY).boot();
    (storage, store)
}

#[tokio::test]
async fn upload_progress_is_monotonic_and_completes() {
    let stream = simulator().upload(InMemoryFile::new("data.json", r#"{"a":1}"#));
    let events: Vec<_> = stream.collect().await;
    let events: Vec<_> = events.into_iter().map(Result::unwrap).collect();

    assert_eq!(events.len(), 10);
    for pair in events.windows(2) {
        assert_eq!(pair[1].progress - pair[0].progress, 10);
    }
    let last = events.last().unwrap();
    assert_eq!(last.progress, 100);
    assert_eq!(last.content, r#"{"a":1}"#);
}

#[tokio::test]
async fn bad_json_errors_with_no_progress() {
    let stream = simulator().upload(InMemoryFile::new("bad.json", "not json"));
    let events: Vec<_> = stream.collect().await;
    assert_eq!(events, vec![Err(UploadError::InvalidJson)]);
    assert_eq!(
        UploadError::InvalidJson.to_string(),
        "Invalid JSON content."
    );
}

#[tokio::test]
async fn duplicate_upload_is_rejected_before_any_transition() {
    let tmp = tempfile::tempdir().unwrap();
    let (_storage, mut store) = json_store(tmp.path());
    store.add_file(stored("x.json")).unwrap();

    let transitions = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&transitions);
    store.register_hook(move |_: &Action, _: &FilesState| {
        *counter.lock() += 1;
        None
    });

    let form = UploadForm::new(InMemoryFile::new("x.json", "{}"), "n-42c-demo", "again");
    let errors = flow().submit(&mut store, form, |_| {}).await.unwrap_err();

    assert_eq!(errors.file, Some(FileFieldError::Duplicate("x.json".into())));
    assert_eq!(*transitions.lock(), 0);
    assert_eq!(selectors::count(&store.snapshot()), 1);
}

#[tokio::test]
async fn abandoned_upload_leaves_state_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let (storage, mut store) = json_store(tmp.path());
    let slow = UploadFlow::new(
        ValidationRules::new("demo"),
        UploadSimulator::new(10, Duration::from_millis(200)),
    );

    let form = UploadForm::new(InMemoryFile::new("a.json", "{}"), "n-42c-demo", "d");
    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        slow.submit(&mut store, form, |_| {}),
    )
    .await;

    assert!(outcome.is_err());
    assert!(store.snapshot().items.is_empty());
    assert_eq!(
        storage.get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
        Some("[]")
    );
}

#[tokio::test]
async fn upload_then_delete_persists_across_restarts() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let (_storage, mut store) = json_store(tmp.path());
        let form = UploadForm::new(
            InMemoryFile::new("data.json", r#"{"a":1}"#),
            "n-42c-demo",
            "public API dump",
        );
        let item = flow().submit(&mut store, form, |_| {}).await.unwrap();
        assert!(!item.valid);
        let form = UploadForm::new(InMemoryFile::new("other.json", "[]"), "m-42c-demo", "ok");
        flow().submit(&mut store, form, |_| {}).await.unwrap();
    }

    let (_storage, mut store) = json_store(tmp.path());
    let rows = selectors::rows(&store.snapshot());
    let names: Vec<_> = rows.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, ["data.json", "other.json"]);
    assert!(!rows[0].valid);

    request_delete(&mut store, &AutoConfirm, "data.json")
        .await
        .unwrap();
    drop(store);

    let (_storage, store) = json_store(tmp.path());
    let state = store.snapshot();
    assert_eq!(selectors::count(&state), 1);
    assert!(selectors::exists(&state, "other.json"));
    assert_eq!(selectors::find(&state, "other.json").unwrap().content, "[]");
}

#[test]
fn hydrate_round_trip_reproduces_items() {
    let items = vec![stored("a.json"), stored("b.json")];
    let raw = encode_snapshot(&items).unwrap();

    let mut store = Store::new();
    store.dispatch(Action::HydrateApply {
        items: decode_snapshot(&raw),
    });
    assert_eq!(store.snapshot().items, items);

    let before = store.snapshot();
    store.dispatch(Action::HydrateApply {
        items: decode_snapshot(&raw),
    });
    assert_eq!(*before, *store.snapshot());
}

#[test]
fn sqlite_backend_hydrates_like_json_backend() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let storage = Arc::new(SqliteStorage::new(tmp.path()).unwrap());
        let mut store = PersistenceSync::new(storage, DEFAULT_STORAGE_KEY).boot();
        store.add_file(stored("a.json")).unwrap();
    }
    let storage = Arc::new(SqliteStorage::new(tmp.path()).unwrap());
    let store = PersistenceSync::new(storage, DEFAULT_STORAGE_KEY).boot();
    assert_eq!(store.snapshot().items, vec![stored("a.json")]);
}

#[test]
fn corrupt_snapshot_on_disk_starts_empty() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(format!("{DEFAULT_STORAGE_KEY}.json")),
        r#"[{"fileName":"a.json"}]"#,
    )
    .unwrap();
    let (storage, store) = json_store(tmp.path());
    assert!(store.snapshot().items.is_empty());
    assert_eq!(
        storage.get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
        Some("[]")
    );
}
