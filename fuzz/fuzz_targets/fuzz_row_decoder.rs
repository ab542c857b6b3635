#![no_main]

use flatql_core::{ColumnDef, FieldType, TableSchema};
use flatql_storage::format::{decode_row, encode_row};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    if line.len() > 4096 || line.contains('\n') {
        return;
    }

    let Ok(schema) = TableSchema::new(
        "fuzz",
        vec![
            ColumnDef::new("s", FieldType::String),
            ColumnDef::new("i", FieldType::Integer),
            ColumnDef::new("n", FieldType::Number),
            ColumnDef::new("b", FieldType::Boolean),
        ],
    ) else {
        return;
    };

    // Decoding arbitrary input should never panic; a decoded row must
    // encode without error
    if let Ok(row) = decode_row(&schema, line) {
        if let Err(e) = encode_row(&schema, &row) {
            panic!("decoded row {:?} does not encode: {}", row, e);
        }
    }
});
