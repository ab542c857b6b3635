//! Table file row codec
//!
//! One row per line: `index;field;field;...;` with a trailing separator.
//!
//! | Type    | Field text                          |
//! |---------|-------------------------------------|
//! | Integer | decimal                             |
//! | Number  | shortest form that parses back      |
//! | Boolean | `True` / `False`                    |
//! | String  | raw text wrapped in single quotes   |

use flatql_core::{ColumnDef, Error, FieldType, Result, Row, SchemaError, TableSchema, Value};
use std::fmt::Write;

/// Field separator
pub const SEPARATOR: char = ';';

/// Check that a value can be stored in the given column.
///
/// Strings may not contain the separator or line breaks since table files
/// have no escaping.
pub fn check_field(column: &ColumnDef, value: &Value) -> Result<()> {
    if value.field_type() != column.field_type {
        return Err(Error::Storage(format!(
            "column `{}` is {} but the row holds a {} value",
            column.name,
            column.field_type,
            value.field_type()
        )));
    }
    if let Value::String(s) = value {
        if s.contains([SEPARATOR, '\n', '\r']) {
            return Err(SchemaError::InvalidLiteral {
                column: column.name.clone(),
                literal: s.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Encode a row as one line, without the line break.
pub fn encode_row(schema: &TableSchema, row: &Row) -> Result<String> {
    if row.values.len() != schema.len() {
        return Err(Error::Storage(format!(
            "row {} has {} values, table `{}` has {} columns",
            row.index,
            row.values.len(),
            schema.name(),
            schema.len()
        )));
    }

    let mut line = format!("{}{}", row.index, SEPARATOR);
    for (column, value) in schema.columns().iter().zip(&row.values) {
        check_field(column, value)?;
        // writing into a String cannot fail
        let _ = match value {
            Value::String(s) => write!(line, "'{}'{}", s, SEPARATOR),
            other => write!(line, "{}{}", other, SEPARATOR),
        };
    }
    Ok(line)
}

fn decode_field(field: &str, field_type: FieldType) -> Option<Value> {
    match field_type {
        // a bare carriage return could never have been written by encode_row
        FieldType::String if field.contains('\r') => None,
        FieldType::String => {
            let s = field.strip_prefix('\'').unwrap_or(field);
            let s = s.strip_suffix('\'').unwrap_or(s);
            Some(Value::String(s.to_string()))
        }
        other => Value::parse(field, other),
    }
}

/// Decode one line. Missing trailing fields take the column default.
pub fn decode_row(schema: &TableSchema, line: &str) -> Result<Row> {
    let line = line.trim_end_matches(['\r', '\n']);
    let body = line.strip_suffix(SEPARATOR).unwrap_or(line);
    let mut fields = body.split(SEPARATOR);

    let index_field = fields.next().unwrap_or_default();
    let index: i64 = index_field
        .trim()
        .parse()
        .map_err(|_| Error::Storage(format!("invalid row index `{}`", index_field)))?;

    let mut row = Row::defaults(index, schema);
    for (position, field) in fields.enumerate() {
        let column = schema.columns().get(position).ok_or_else(|| {
            Error::Storage(format!(
                "row {} has more fields than table `{}` has columns",
                index,
                schema.name()
            ))
        })?;
        row.values[position] = decode_field(field, column.field_type).ok_or_else(|| {
            Error::Storage(format!(
                "row {}: `{}` is not a valid {} for column `{}`",
                index, field, column.field_type, column.name
            ))
        })?;
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema::new(
            "people",
            vec![
                ColumnDef::new("name", FieldType::String),
                ColumnDef::new("age", FieldType::Integer),
                ColumnDef::new("height", FieldType::Number),
                ColumnDef::new("admin", FieldType::Boolean),
            ],
        )
        .unwrap()
    }

    fn ann() -> Row {
        Row::new(
            1,
            vec![
                Value::String("Ann Lee".to_string()),
                Value::Integer(30),
                Value::Number(1.7),
                Value::Boolean(true),
            ],
        )
    }

    #[test]
    fn test_encode_row() {
        assert_eq!(encode_row(&schema(), &ann()).unwrap(), "1;'Ann Lee';30;1.7;True;");
    }

    #[test]
    fn test_number_formatting() {
        let mut row = ann();
        row.values[2] = Value::Number(30.0);
        assert_eq!(encode_row(&schema(), &row).unwrap(), "1;'Ann Lee';30;30;True;");

        let decoded = decode_row(&schema(), "1;'Ann Lee';30;30;True;").unwrap();
        assert_eq!(decoded.values[2], Value::Number(30.0));
    }

    #[test]
    fn test_decode_row() {
        let row = decode_row(&schema(), "1;'Ann Lee';30;1.7;True;\n").unwrap();
        assert_eq!(row, ann());
    }

    #[test]
    fn test_decode_pads_short_rows() {
        let row = decode_row(&schema(), "4;'Bo';").unwrap();
        assert_eq!(row.index, 4);
        assert_eq!(row.values[0], Value::String("Bo".to_string()));
        assert_eq!(row.values[1], Value::Integer(0));
        assert_eq!(row.values[3], Value::Boolean(false));
    }

    #[test]
    fn test_decode_rejects_bad_rows() {
        assert!(decode_row(&schema(), "x;'a';1;1;True;").is_err());
        assert!(decode_row(&schema(), "1;'a';old;1;True;").is_err());
        assert!(decode_row(&schema(), "1;'a';1;1;True;extra;").is_err());
    }

    #[test]
    fn test_decode_rejects_carriage_return() {
        assert!(matches!(
            decode_row(&schema(), "1;'a\rb';30;1.7;True;"),
            Err(Error::Storage(_))
        ));
        // a CRLF line ending is still accepted
        assert_eq!(decode_row(&schema(), "1;'Ann Lee';30;1.7;True;\r\n").unwrap(), ann());
    }

    #[test]
    fn test_reserved_characters_rejected() {
        let mut row = ann();
        row.values[0] = Value::String("a;b".to_string());
        let err = encode_row(&schema(), &row).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::InvalidLiteral { .. })));
    }

    #[test]
    fn test_mismatched_row_rejected() {
        let mut row = ann();
        row.values[1] = Value::String("thirty".to_string());
        assert!(matches!(encode_row(&schema(), &row), Err(Error::Storage(_))));

        row.values.pop();
        assert!(matches!(encode_row(&schema(), &row), Err(Error::Storage(_))));
    }
}
