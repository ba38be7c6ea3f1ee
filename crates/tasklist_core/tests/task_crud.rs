use tasklist_core::db::{open_db, open_db_in_memory};
use tasklist_core::{
    KeyValueStore, KvTaskRepository, MemoryKvStore, RepoError, SqliteKvStore, Task, TaskPatch,
    TaskRepository, TaskValidationError, TASKS_KEY,
};

#[test]
fn missing_key_loads_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));

    assert!(repo.load_tasks().unwrap().is_empty());
}

#[test]
fn empty_and_null_blobs_load_as_empty_collection() {
    for raw in ["", "   ", "null"] {
        let repo = KvTaskRepository::new(MemoryKvStore::with_item(TASKS_KEY, raw));
        assert!(repo.load_tasks().unwrap().is_empty(), "blob `{raw}`");
    }
}

#[test]
fn create_appends_in_insertion_order_and_persists_json_array() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));

    repo.create_task(&Task::new("1", "first").unwrap()).unwrap();
    repo.create_task(&Task::new("2", "second").unwrap()).unwrap();

    let ids: Vec<_> = repo
        .load_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec!["1", "2"]);

    let raw = repo.store().get_item(TASKS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"id": "1", "title": "first", "completed": false},
            {"id": "2", "title": "second", "completed": false}
        ])
    );
}

#[test]
fn create_rejects_duplicate_id_without_writing() {
    let repo = KvTaskRepository::new(MemoryKvStore::new());
    repo.create_task(&Task::new("1", "original").unwrap()).unwrap();

    let err = repo
        .create_task(&Task::new("1", "impostor").unwrap())
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateId(id) if id == "1"));

    let tasks = repo.load_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "original");
}

#[test]
fn create_rejects_invalid_task() {
    let repo = KvTaskRepository::new(MemoryKvStore::new());
    let invalid = Task {
        id: "1".to_string(),
        title: "   ".to_string(),
        completed: false,
    };

    let err = repo.create_task(&invalid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyTitle)
    ));
    assert!(repo.store().get_item(TASKS_KEY).unwrap().is_none());
}

#[test]
fn update_merges_patch_into_existing_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
    repo.create_task(&Task::new("1", "write tests").unwrap())
        .unwrap();
    repo.create_task(&Task::new("2", "untouched").unwrap())
        .unwrap();

    let updated = repo.update_task("1", &TaskPatch::completed(true)).unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "write tests");

    let tasks = repo.load_tasks().unwrap();
    assert!(tasks[0].completed);
    assert!(!tasks[1].completed);
}

#[test]
fn update_missing_id_returns_not_found() {
    let repo = KvTaskRepository::new(MemoryKvStore::new());
    repo.create_task(&Task::new("1", "present").unwrap())
        .unwrap();

    let err = repo
        .update_task("404", &TaskPatch::completed(true))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "404"));
}

#[test]
fn update_with_blank_title_keeps_stored_value() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
    repo.create_task(&Task::new("1", "keep").unwrap()).unwrap();

    let err = repo.update_task("1", &TaskPatch::title("  ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.load_tasks().unwrap()[0].title, "keep");
    assert!(conn.is_autocommit());
}

#[test]
fn delete_returns_remaining_and_missing_id_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
    repo.create_task(&Task::new("1", "a").unwrap()).unwrap();
    repo.create_task(&Task::new("2", "b").unwrap()).unwrap();

    let remaining = repo.delete_task("1").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "2");

    let unchanged = repo.delete_task("1").unwrap();
    assert_eq!(unchanged, remaining);
    assert_eq!(repo.load_tasks().unwrap(), remaining);
}

#[test]
fn undecodable_blob_is_reported_not_masked() {
    let repo = KvTaskRepository::new(MemoryKvStore::with_item(TASKS_KEY, "{not json"));

    let err = repo.load_tasks().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let err = repo
        .create_task(&Task::new("1", "would clobber").unwrap())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(
        repo.store().get_item(TASKS_KEY).unwrap().as_deref(),
        Some("{not json")
    );
}

#[test]
fn persisted_task_with_blank_title_is_invalid_data() {
    let repo = KvTaskRepository::new(MemoryKvStore::with_item(
        TASKS_KEY,
        r#"[{"id":"1","title":"","completed":false}]"#,
    ));

    let err = repo.load_tasks().unwrap_err();
    assert!(err.to_string().contains("task `1`"), "unexpected error: {err}");
}

#[test]
fn persisted_duplicate_ids_are_invalid_data() {
    let repo = KvTaskRepository::new(MemoryKvStore::with_item(
        TASKS_KEY,
        r#"[{"id":"1","title":"a","completed":false},{"id":"1","title":"b","completed":false}]"#,
    ));

    let err = repo.load_tasks().unwrap_err();
    assert!(
        err.to_string().contains("duplicate task id `1`"),
        "unexpected error: {err}"
    );

    let err = repo.toggle_task("1").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    let raw = repo.store().get_item(TASKS_KEY).unwrap().unwrap();
    assert!(!raw.contains(r#""completed":true"#));
}

#[test]
fn toggle_task_flips_stored_state_and_reports_missing_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
    repo.create_task(&Task::new("1", "flip").unwrap()).unwrap();

    assert!(repo.toggle_task("1").unwrap().completed);
    assert!(!repo.toggle_task("1").unwrap().completed);
    assert!(matches!(
        repo.toggle_task("2").unwrap_err(),
        RepoError::NotFound(id) if id == "2"
    ));
}

#[test]
fn toggles_from_two_connections_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    {
        let conn = open_db(&path).unwrap();
        KvTaskRepository::new(SqliteKvStore::new(&conn))
            .create_task(&Task::new("1", "contended").unwrap())
            .unwrap();
    }

    const TOGGLES_PER_WRITER: usize = 25;
    std::thread::scope(|scope| {
        for _ in 0..2 {
            let path = path.clone();
            scope.spawn(move || {
                let conn = open_db(&path).unwrap();
                let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
                for _ in 0..TOGGLES_PER_WRITER {
                    repo.toggle_task("1").unwrap();
                }
            });
        }
    });

    let conn = open_db(&path).unwrap();
    let tasks = KvTaskRepository::new(SqliteKvStore::new(&conn))
        .load_tasks()
        .unwrap();
    // 50 flips in total: an even count returns to pending.
    assert!(!tasks[0].completed);
}

#[test]
fn creates_from_two_connections_serialize_without_lost_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    drop(open_db(&path).unwrap());

    const CREATES_PER_WRITER: usize = 20;
    std::thread::scope(|scope| {
        for writer in 0..2 {
            let path = path.clone();
            scope.spawn(move || {
                let conn = open_db(&path).unwrap();
                let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
                for n in 0..CREATES_PER_WRITER {
                    let task = Task::new(format!("{writer}-{n}"), "row").unwrap();
                    repo.create_task(&task).unwrap();
                }
            });
        }
    });

    let conn = open_db(&path).unwrap();
    let tasks = KvTaskRepository::new(SqliteKvStore::new(&conn))
        .load_tasks()
        .unwrap();
    assert_eq!(tasks.len(), 2 * CREATES_PER_WRITER);
    assert!(conn.is_autocommit());
}

#[test]
fn retain_tasks_removes_non_matching_and_reports_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
    repo.create_task(&Task::new("1", "keep").unwrap()).unwrap();
    repo.create_task(&Task::new("2", "drop").unwrap()).unwrap();
    repo.create_task(&Task::new("3", "keep too").unwrap())
        .unwrap();

    let removed = repo.retain_tasks(&|task| task.id != "2").unwrap();
    assert_eq!(removed, 1);

    let ids: Vec<_> = repo
        .load_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(repo.retain_tasks(&|_| true).unwrap(), 0);
}

#[test]
fn collection_survives_reopen_of_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    {
        let conn = open_db(&path).unwrap();
        let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
        repo.create_task(&Task::new("1", "persist me").unwrap())
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = KvTaskRepository::new(SqliteKvStore::new(&conn));
    let tasks = repo.load_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "persist me");
}
