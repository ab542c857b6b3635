mod common;

use common::DbTestFixture;
use flatql::{Error, ExecutionResult, FieldType, Row, SchemaError, Value};

fn user(index: i64, name: &str, age: i64) -> Row {
    Row::new(
        index,
        vec![Value::String(name.to_string()), Value::Integer(age)],
    )
}

fn users_fixture() -> (DbTestFixture, flatql::Database) {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&[
        "DATASET users name STRING age INTEGER",
        "INSERT_INTO users name='Ann' age=30",
        "INSERT_INTO users name='Bob' age=20",
        "INSERT_INTO users name='Cid' age=40",
    ]);
    (fixture, db)
}

fn select(db: &flatql::Database, query: &str) -> Vec<Row> {
    db.execute(query).unwrap().rows().to_vec()
}

#[test]
fn test_create_insert_select_delete() {
    let fixture = DbTestFixture::new();
    let db = fixture.open();

    let created = db.execute("DATASET users name STRING age INTEGER").unwrap();
    assert_eq!(
        created,
        ExecutionResult::Created {
            table: "users".to_string()
        }
    );

    let inserted = db.execute("INSERT_INTO users name='Ann' age=30").unwrap();
    assert!(matches!(inserted, ExecutionResult::Inserted { index: 1, .. }));

    assert_eq!(select(&db, "SELECT users age>25"), vec![user(1, "Ann", 30)]);

    let deleted = db.execute("DELETE users age>25").unwrap();
    assert!(matches!(deleted, ExecutionResult::Deleted { count: 1, .. }));

    assert!(select(&db, "SELECT users").is_empty());
}

#[test]
fn test_create_then_find_table() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&["DATASET:people name:STRING age:INTEGER height:NUMBER admin:BOOLEAN"]);

    let schema = db.find_table("people").unwrap().unwrap();
    let columns: Vec<(&str, FieldType)> = schema
        .columns()
        .iter()
        .map(|c| (c.name.as_str(), c.field_type))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("name", FieldType::String),
            ("age", FieldType::Integer),
            ("height", FieldType::Number),
            ("admin", FieldType::Boolean),
        ]
    );

    assert!(fixture.table_file("people").exists());
    assert!(fixture.read_table("people").is_empty());
    assert!(db.find_table("persons").unwrap().is_none());
}

#[test]
fn test_insert_converts_values() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&[
        "DATASET people name STRING age INTEGER height NUMBER admin BOOLEAN",
        "INSERT_INTO people name='Ann Lee' age=30 height=1.75 admin=True",
    ]);

    let rows = select(&db, "SELECT people");
    assert_eq!(
        rows,
        vec![Row::new(
            1,
            vec![
                Value::String("Ann Lee".to_string()),
                Value::Integer(30),
                Value::Number(1.75),
                Value::Boolean(true),
            ]
        )]
    );

    let contents = String::from_utf8(fixture.read_table("people")).unwrap();
    assert_eq!(contents, "1;'Ann Lee';30;1.75;True;\n");
}

#[test]
fn test_insert_defaults_and_order() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&[
        "DATASET people name STRING age INTEGER height NUMBER admin BOOLEAN",
        "INSERT_INTO people age=7 name=Zed",
    ]);

    assert_eq!(
        select(&db, "SELECT people"),
        vec![Row::new(
            1,
            vec![
                Value::String("Zed".to_string()),
                Value::Integer(7),
                Value::Number(0.0),
                Value::Boolean(false),
            ]
        )]
    );
}

#[test]
fn test_insert_index_follows_largest() {
    let (_fixture, db) = users_fixture();

    db.execute("DELETE users name=Bob").unwrap();
    let inserted = db.execute("INSERT_INTO users name=Dan age=50").unwrap();
    assert!(matches!(inserted, ExecutionResult::Inserted { index: 4, .. }));

    db.execute("DELETE users age>=40").unwrap();
    let inserted = db.execute("INSERT_INTO users name=Eve age=22").unwrap();
    assert!(matches!(inserted, ExecutionResult::Inserted { index: 2, .. }));
}

#[test]
fn test_select_operators() {
    let (_fixture, db) = users_fixture();

    assert_eq!(select(&db, "SELECT users age=30"), vec![user(1, "Ann", 30)]);
    assert_eq!(select(&db, "SELECT users age!=30").len(), 2);
    assert_eq!(select(&db, "SELECT users age<>30").len(), 2);
    assert_eq!(select(&db, "SELECT users age<30"), vec![user(2, "Bob", 20)]);
    assert_eq!(
        select(&db, "SELECT users age<=30"),
        vec![user(1, "Ann", 30), user(2, "Bob", 20)]
    );
    assert_eq!(
        select(&db, "SELECT users age>=30"),
        vec![user(1, "Ann", 30), user(3, "Cid", 40)]
    );
    assert_eq!(select(&db, "SELECT users name>Bob"), vec![user(3, "Cid", 40)]);
    assert_eq!(
        select(&db, "SELECT users age>10 name<Cid"),
        vec![user(1, "Ann", 30), user(2, "Bob", 20)]
    );
    assert!(select(&db, "SELECT users age>100").is_empty());
}

#[test]
fn test_select_number_and_boolean() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&[
        "DATASET items price NUMBER stocked BOOLEAN",
        "INSERT_INTO items price=1.5 stocked=True",
        "INSERT_INTO items price=2.5 stocked=False",
    ]);

    assert_eq!(select(&db, "SELECT items price<=1.5").len(), 1);
    assert_eq!(select(&db, "SELECT items price>1.75").len(), 1);

    let stocked = select(&db, "SELECT items stocked=True");
    assert_eq!(stocked.len(), 1);
    assert_eq!(stocked[0].index, 1);

    // every operator compares booleans for equality
    let stocked = select(&db, "SELECT items stocked>True");
    assert_eq!(stocked.len(), 1);
    assert_eq!(stocked[0].index, 1);
}

#[test]
fn test_update_with_conditions() {
    let (fixture, db) = users_fixture();

    let updated = db.execute("UPDATE users age>25 age=41").unwrap();
    assert!(matches!(updated, ExecutionResult::Updated { count: 2, .. }));

    assert_eq!(
        select(&db, "SELECT users"),
        vec![user(1, "Ann", 41), user(2, "Bob", 20), user(3, "Cid", 41)]
    );
    assert_eq!(fixture.list_files(), vec!["__tables_data.dat", "users.tbl"]);
}

#[test]
fn test_update_leading_equals_is_a_filter() {
    let fixture = DbTestFixture::new();
    let db = fixture.with_statements(&[
        "DATASET users name STRING age INTEGER",
        "INSERT_INTO users name='Ann' age=30",
        "INSERT_INTO users name='Bob' age=20",
    ]);

    let updated = db.execute("UPDATE users name='Ann' age=31").unwrap();
    assert!(matches!(updated, ExecutionResult::Updated { count: 1, .. }));
    assert_eq!(
        select(&db, "SELECT users"),
        vec![user(1, "Ann", 31), user(2, "Bob", 20)]
    );

    // several columns are assigned with `:`
    db.execute("UPDATE users name=Bob name:Ben age:21").unwrap();
    assert_eq!(
        select(&db, "SELECT users"),
        vec![user(1, "Ann", 31), user(2, "Ben", 21)]
    );
}

#[test]
fn test_update_explicit_assignment() {
    let (_fixture, db) = users_fixture();

    let updated = db.execute("UPDATE users name=Bob age:21").unwrap();
    assert!(matches!(updated, ExecutionResult::Updated { count: 1, .. }));
    assert_eq!(select(&db, "SELECT users name=Bob"), vec![user(2, "Bob", 21)]);

    // without conditions every row is updated
    db.execute("UPDATE users name=Any").unwrap();
    assert_eq!(select(&db, "SELECT users name=Any").len(), 3);
}

#[test]
fn test_update_zero_matches_leaves_file_identical() {
    let (fixture, db) = users_fixture();
    let before = fixture.read_table("users");

    let updated = db.execute("UPDATE users age>100 age=1").unwrap();
    assert!(matches!(updated, ExecutionResult::Updated { count: 0, .. }));
    assert_eq!(fixture.read_table("users"), before);
}

#[test]
fn test_update_is_idempotent() {
    let (fixture, db) = users_fixture();

    db.execute("UPDATE users age<35 name=Young").unwrap();
    let once = fixture.read_table("users");

    db.execute("UPDATE users age<35 name=Young").unwrap();
    assert_eq!(fixture.read_table("users"), once);
}

#[test]
fn test_delete_all_rows() {
    let (fixture, db) = users_fixture();

    let deleted = db.execute("DELETE users").unwrap();
    assert!(matches!(deleted, ExecutionResult::Deleted { count: 3, .. }));
    assert!(select(&db, "SELECT users").is_empty());
    assert!(fixture.read_table("users").is_empty());
}

#[test]
fn test_delete_keeps_order_of_survivors() {
    let (_fixture, db) = users_fixture();

    db.execute("DELETE users name=Bob").unwrap();
    assert_eq!(
        select(&db, "SELECT users"),
        vec![user(1, "Ann", 30), user(3, "Cid", 40)]
    );
}

#[test]
fn test_create_errors() {
    let (fixture, db) = users_fixture();
    let catalog = std::fs::read(fixture.data_dir().join("__tables_data.dat")).unwrap();

    assert!(matches!(
        db.execute("DATASET users name STRING"),
        Err(Error::Schema(SchemaError::DuplicateTable(_)))
    ));
    assert!(matches!(
        db.execute("DATASET users name BLOB"),
        Err(Error::Schema(SchemaError::DuplicateTable(_)))
    ));
    assert!(matches!(
        db.execute("DATASET things name BLOB"),
        Err(Error::Classification(_))
    ));
    assert!(matches!(
        db.execute("DATASET things"),
        Err(Error::Schema(SchemaError::NoColumns(_)))
    ));
    assert!(matches!(
        db.execute("DATASET things a STRING a INTEGER"),
        Err(Error::Schema(SchemaError::DuplicateColumn(_)))
    ));
    assert!(matches!(
        db.execute("DATASET things a>STRING"),
        Err(Error::Schema(SchemaError::ExpectedAssignment(_)))
    ));

    assert_eq!(
        std::fs::read(fixture.data_dir().join("__tables_data.dat")).unwrap(),
        catalog
    );
    assert!(!fixture.table_file("things").exists());
}

#[test]
fn test_insert_errors_leave_table_untouched() {
    let (fixture, db) = users_fixture();
    let before = fixture.read_table("users");

    let cases: [(&str, fn(&Error) -> bool); 6] = [
        ("INSERT_INTO users email=x", |e| {
            matches!(e, Error::Schema(SchemaError::UnknownColumn { .. }))
        }),
        ("INSERT_INTO users name=a name=b", |e| {
            matches!(e, Error::Schema(SchemaError::DuplicateColumn(_)))
        }),
        ("INSERT_INTO users name=a age=1 name=b", |e| {
            matches!(e, Error::Schema(SchemaError::TooManyColumns { limit: 2, got: 3 }))
        }),
        ("INSERT_INTO users age=old", |e| {
            matches!(e, Error::Schema(SchemaError::InvalidLiteral { .. }))
        }),
        ("INSERT_INTO users name='a;b'", |e| {
            matches!(e, Error::Schema(SchemaError::InvalidLiteral { .. }))
        }),
        ("INSERT_INTO users age>3", |e| {
            matches!(e, Error::Schema(SchemaError::ExpectedAssignment(_)))
        }),
    ];

    for (query, expected) in cases {
        let err = db.execute(query).unwrap_err();
        assert!(expected(&err), "`{}` returned {:?}", query, err);
        assert_eq!(fixture.read_table("users"), before, "`{}` changed the table", query);
    }
}

#[test]
fn test_update_and_delete_errors_leave_table_untouched() {
    let (fixture, db) = users_fixture();
    let before = fixture.read_table("users");

    assert!(matches!(
        db.execute("UPDATE users age>25 age=old"),
        Err(Error::Schema(SchemaError::InvalidLiteral { .. }))
    ));
    assert!(matches!(
        db.execute("UPDATE users age>25"),
        Err(Error::Schema(SchemaError::ExpectedAssignment(_)))
    ));
    assert!(matches!(
        db.execute("UPDATE users email=x age=1"),
        Err(Error::Schema(SchemaError::UnknownColumn { .. }))
    ));
    assert!(matches!(
        db.execute("DELETE users email=x"),
        Err(Error::Schema(SchemaError::UnknownColumn { .. }))
    ));
    assert!(matches!(
        db.execute("DELETE users age>old"),
        Err(Error::Evaluation(_))
    ));

    assert_eq!(fixture.read_table("users"), before);
    assert_eq!(fixture.list_files(), vec!["__tables_data.dat", "users.tbl"]);
}

#[test]
fn test_unknown_table_and_command() {
    let (_fixture, db) = users_fixture();

    for query in [
        "SELECT ghosts",
        "INSERT_INTO ghosts name=a",
        "UPDATE ghosts a=1",
        "DELETE ghosts",
    ] {
        assert!(
            matches!(
                db.execute(query),
                Err(Error::Schema(SchemaError::UnknownTable(_)))
            ),
            "{}",
            query
        );
    }

    assert!(matches!(db.execute("DROP users"), Err(Error::Classification(_))));
    assert!(matches!(db.execute("select users"), Err(Error::Classification(_))));
    assert!(matches!(db.execute("SELECT"), Err(Error::Parse(_))));
    assert!(matches!(db.execute("SELECT users name='Ann"), Err(Error::Parse(_))));
}
