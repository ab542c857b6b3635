//! # FlatQL CLI
//!
//! An interactive shell over one data directory. Each input line is one
//! statement.

use std::env;
use std::io::{self, BufRead, Write};

use flatql::logging::LogConfig;
use flatql::Database;

fn main() {
    let _guard = LogConfig::warn().with_stderr().init();

    let args: Vec<String> = env::args().collect();
    let data_dir = match args.get(1).map(String::as_str) {
        Some("--version" | "-V") => {
            println!("FlatQL v{}", flatql::VERSION);
            return;
        }
        Some("--help" | "-h") => {
            println!("usage: flatql [DATA_DIR]");
            return;
        }
        Some(dir) => dir.to_string(),
        None => ".".to_string(),
    };

    println!("FlatQL v{}", flatql::VERSION);
    println!("Enter \".help\" for usage hints.");
    println!("Data directory: {}", data_dir);

    let db = match Database::open(&data_dir) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("error: cannot open {}: {}", data_dir, e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("flatql> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(_) => break,
        }

        let statement = line.trim();
        match statement {
            "" => continue,
            "exit" | "\\q" | ".quit" | ".exit" => break,
            cmd if cmd.starts_with('.') => handle_dot_command(cmd, &db),
            _ => match db.execute(statement) {
                Ok(result) => println!("{}", result),
                Err(e) => eprintln!("error: {}", e),
            },
        }
    }

    println!();
}

fn handle_dot_command(cmd: &str, db: &Database) {
    match cmd.split_whitespace().next().unwrap_or_default() {
        ".help" => print_help(),
        ".tables" => match db.tables() {
            Ok(tables) => {
                for schema in tables {
                    let columns: Vec<String> = schema
                        .columns()
                        .iter()
                        .map(|c| format!("{} {}", c.name, c.field_type))
                        .collect();
                    println!("{} ({})", schema.name(), columns.join(", "));
                }
            }
            Err(e) => eprintln!("error: {}", e),
        },
        other => {
            eprintln!("error: unknown command {}", other);
            eprintln!("Use \".help\" for usage hints.");
        }
    }
}

fn print_help() {
    println!("DATASET <table> <column> <TYPE> ...          Create a table");
    println!("INSERT_INTO <table> <column>=<value> ...     Append a row");
    println!("SELECT <table> [<column><op><value> ...]     Show matching rows");
    println!("UPDATE <table> [<condition> ...] <column>=<value>");
    println!("                                             Change matching rows");
    println!("DELETE <table> [<column><op><value> ...]     Remove matching rows");
    println!();
    println!("Types: INTEGER NUMBER STRING BOOLEAN");
    println!("Operators: = != <> < > <= >=   (':' always assigns)");
    println!("UPDATE assigns several columns with <column>:<value> ...");
    println!();
    println!(".tables            List all tables");
    println!(".help              Show this help");
    println!("exit, \\q           Exit this program");
}
