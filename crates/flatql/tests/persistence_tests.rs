mod common;

use common::DbTestFixture;
use flatql::{Database, Error, StorageConfig, SyncMode, Value};
use std::fs;

#[test]
fn test_fixture_creates_data_dir() {
    let fixture = DbTestFixture::new();
    assert!(!fixture.data_dir().exists());

    let _db = fixture.open();
    assert!(fixture.data_dir().is_dir());
    assert_eq!(fixture.list_files(), vec!["__tables_data.dat"]);
}

#[test]
fn test_data_survives_reopen() {
    let fixture = DbTestFixture::new();

    {
        let db = fixture.open();
        db.execute("DATASET users name STRING age INTEGER").unwrap();
        db.execute("DATASET flags on BOOLEAN").unwrap();
        db.execute("INSERT_INTO users name='Ann' age=30").unwrap();
        db.execute("INSERT_INTO users name='Bob' age=20").unwrap();
    }

    let db = fixture.open();
    let names: Vec<String> = db
        .tables()
        .unwrap()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["users", "flags"]);

    let rows = db.execute("SELECT users age<25").unwrap().rows().to_vec();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values[0], Value::String("Bob".to_string()));

    // the index keeps counting from what is on disk
    let inserted = db.execute("INSERT_INTO users name=Cid").unwrap();
    assert_eq!(inserted.to_string(), "inserted row 3 into `users`");
}

#[test]
fn test_missing_table_file_reads_as_empty() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&[
        "DATASET users name STRING",
        "INSERT_INTO users name=Ann",
    ]);

    fs::remove_file(fixture.table_file("users")).unwrap();
    assert!(db.execute("SELECT users").unwrap().rows().is_empty());

    db.execute("INSERT_INTO users name=Bob").unwrap();
    assert_eq!(fixture.read_table("users"), b"1;'Bob';\n");
}

#[test]
fn test_hand_edited_short_row_gets_defaults() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&["DATASET users name STRING age INTEGER"]);

    fs::write(fixture.table_file("users"), "7;'Ann';\n").unwrap();

    let rows = db.execute("SELECT users").unwrap().rows().to_vec();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].index, 7);
    assert_eq!(rows[0].values[1], Value::Integer(0));
}

#[test]
fn test_insert_after_largest_index_fails_cleanly() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&["DATASET users name STRING"]);

    let contents = format!("{};'Ann';\n", i64::MAX);
    fs::write(fixture.table_file("users"), &contents).unwrap();

    assert_eq!(db.execute("SELECT users").unwrap().rows().len(), 1);
    assert!(matches!(
        db.execute("INSERT_INTO users name=Bob"),
        Err(Error::Storage(_))
    ));
    assert_eq!(fixture.read_table("users"), contents.as_bytes());
}

#[test]
fn test_corrupt_row_is_a_storage_error() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&[
        "DATASET users name STRING age INTEGER",
        "INSERT_INTO users name=Ann age=30",
    ]);

    let mut contents = fixture.read_table("users");
    contents.extend_from_slice(b"2;'Bob';twenty;\n");
    fs::write(fixture.table_file("users"), &contents).unwrap();

    match db.execute("SELECT users") {
        Err(Error::Storage(msg)) => assert!(msg.contains("users.tbl:2:"), "{}", msg),
        other => panic!("unexpected result {:?}", other),
    }

    // a rewrite is refused before it could drop the unreadable row
    assert!(db.execute("DELETE users name=Ann").is_err());
    assert_eq!(fixture.read_table("users"), contents);
}

#[test]
fn test_corrupt_catalog_is_rejected() {
    let fixture = DbTestFixture::new();
    fixture.with_statements(&["DATASET users name STRING"]);

    let catalog_path = fixture.data_dir().join("__tables_data.dat");
    let mut catalog = fs::read(&catalog_path).unwrap();
    let last = catalog.len() - 10;
    catalog[last] ^= 0xFF;
    fs::write(&catalog_path, &catalog).unwrap();

    let db = fixture.open();
    assert!(matches!(db.find_table("users"), Err(Error::Storage(_))));
}

#[test]
fn test_unsynced_config_behaves_the_same() {
    let fixture = DbTestFixture::new();
    let config = StorageConfig {
        sync_mode: SyncMode::None,
        ..Default::default()
    };

    let db = Database::open_with_config(fixture.data_dir(), config).unwrap();
    db.execute("DATASET users name STRING").unwrap();
    db.execute("INSERT_INTO users name=Ann").unwrap();
    db.execute("UPDATE users name=Bob").unwrap();

    drop(db);
    let db = fixture.open();
    let rows = db.execute("SELECT users name=Bob").unwrap().rows().to_vec();
    assert_eq!(rows.len(), 1);
}
