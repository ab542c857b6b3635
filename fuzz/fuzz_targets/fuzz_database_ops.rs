#![no_main]

use arbitrary::Arbitrary;
use flatql::Database;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum DbOp {
    Insert { name: String, age: i64 },
    Select { condition: String },
    Update { condition: String, age: i64 },
    Delete { condition: String },
    Raw { statement: String },
}

fuzz_target!(|ops: Vec<DbOp>| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let Ok(db) = Database::open(dir.path()) else {
        return;
    };
    if db.execute("DATASET users name STRING age INTEGER").is_err() {
        return;
    }

    for op in ops.iter().take(50) { // Limit operations to prevent timeout
        let statement = match op {
            DbOp::Insert { name, age } => format!("INSERT_INTO users name='{}' age={}", name, age),
            DbOp::Select { condition } => format!("SELECT users {}", condition),
            DbOp::Update { condition, age } => format!("UPDATE users {} age:{}", condition, age),
            DbOp::Delete { condition } => format!("DELETE users {}", condition),
            DbOp::Raw { statement } => statement.clone(),
        };
        if statement.len() > 1024 {
            continue;
        }

        // Statements may fail, but the table must stay readable
        let _ = db.execute(&statement);
        assert!(db.execute("SELECT users").is_ok());
    }
});
