use chrono::Utc;
use rusqlite::Connection;
use tasklist_core::db::{open_db, open_db_in_memory, schema_version, DbError, SCHEMA_VERSION};
use tasklist_core::{KeyValueStore, SqliteKeyValueStore};

#[test]
fn fresh_store_gets_kv_table_and_version() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    assert_eq!(columns(&conn), vec!["key", "value", "updated_at"]);
}

#[test]
fn set_stamps_updated_at_from_column_default() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::new(&conn);

    let before = Utc::now().timestamp() * 1000;
    kv.set("tasks", "[]").unwrap();
    let after = Utc::now().timestamp() * 1000;

    let stamped = updated_at(&conn, "tasks");
    assert!(
        (before..=after).contains(&stamped),
        "updated_at {stamped} outside {before}..={after}"
    );
    assert_eq!(stamped % 1000, 0);
}

#[test]
fn overwrite_replaces_value_and_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::new(&conn);
    kv.set("theme", "light").unwrap();
    conn.execute("UPDATE kv_entries SET updated_at = 0 WHERE key = 'theme';", [])
        .unwrap();

    kv.set("theme", "dark").unwrap();

    assert_eq!(kv.get("theme").unwrap().as_deref(), Some("dark"));
    assert!(updated_at(&conn, "theme") > 0);
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn reopening_file_keeps_entries_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasklist.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        SqliteKeyValueStore::new(&conn).set("tasks", "[]").unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    assert_eq!(
        SqliteKeyValueStore::new(&conn).get("tasks").unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn file_from_newer_build_is_refused_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    let newer = SCHEMA_VERSION + 1;
    {
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", newer).unwrap();
    }

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, newer);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), newer);
    assert!(columns(&conn).is_empty());
}

fn columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('kv_entries') ORDER BY cid;")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}

fn updated_at(conn: &Connection, key: &str) -> i64 {
    conn.query_row(
        "SELECT updated_at FROM kv_entries WHERE key = ?1;",
        [key],
        |row| row.get(0),
    )
    .unwrap()
}
