use freightdesk_store::Store;

#[test]
fn migrations_apply_once() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store.migrate().expect("migrate again");

    assert_eq!(store.schema_version().expect("schema version"), 1);
    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM freightdesk_schema;", [], |row| {
            row.get(0)
        })
        .expect("schema rows");
    assert_eq!(rows, 1);
}

#[test]
fn file_backed_store_reopens_with_data() {
    let temp = tempfile::TempDir::new().expect("temp dir");
    let path = temp.path().join("nested").join("freightdesk.sqlite3");

    let store = Store::open(&path).expect("open");
    store.migrate().expect("migrate");
    store
        .connection()
        .execute(
            "INSERT INTO calls (sentiment, dba, datetime, outcome, created_at) VALUES ('neutral', 'Acme', 1, 'no', 1);",
            [],
        )
        .expect("insert");
    store.close().expect("close");

    let reopened = Store::open(&path).expect("reopen");
    reopened.migrate().expect("migrate");
    assert_eq!(reopened.calls().list().expect("list").len(), 1);
}
