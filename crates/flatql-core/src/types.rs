//! Data model shared by the lexer, the storage engine and the executors.

use crate::error::{Result, SchemaError};
use std::fmt;

/// Maximum number of columns in one table.
pub const MAX_COLUMNS: usize = 128;

/// Maximum length in bytes of a table or column name.
pub const MAX_NAME_LEN: usize = 127;

/// Column data types. Fixed when the table is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    /// Signed 64-bit integer
    Integer = 0,
    /// 64-bit float
    Number = 1,
    /// UTF-8 text without `;` or line breaks
    String = 2,
    /// `True` / `False`
    Boolean = 3,
}

impl FieldType {
    /// One-byte tag used by the catalog file
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Inverse of [`FieldType::tag`]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FieldType::Integer),
            1 => Some(FieldType::Number),
            2 => Some(FieldType::String),
            3 => Some(FieldType::Boolean),
            _ => None,
        }
    }

    /// Keyword spelling used in `DATASET` statements
    pub fn keyword(self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Number => "NUMBER",
            FieldType::String => "STRING",
            FieldType::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A stored column value. The variant is the type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Value of an `INTEGER` column
    Integer(i64),
    /// Value of a `NUMBER` column
    Number(f64),
    /// Value of a `STRING` column
    String(String),
    /// Value of a `BOOLEAN` column
    Boolean(bool),
}

impl Value {
    /// The value an unassigned column takes.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Integer => Value::Integer(0),
            FieldType::Number => Value::Number(0.0),
            FieldType::String => Value::String(String::new()),
            FieldType::Boolean => Value::Boolean(false),
        }
    }

    /// Convert a query literal to a value of the given type.
    ///
    /// Surrounding single quotes are stripped from string literals. Booleans
    /// accept exactly `True` or `False`. Returns `None` when the literal does
    /// not fit the type.
    pub fn parse(literal: &str, field_type: FieldType) -> Option<Self> {
        match field_type {
            FieldType::Integer => literal.trim().parse().ok().map(Value::Integer),
            FieldType::Number => literal.trim().parse().ok().map(Value::Number),
            FieldType::Boolean => match literal {
                "True" => Some(Value::Boolean(true)),
                "False" => Some(Value::Boolean(false)),
                _ => None,
            },
            FieldType::String => {
                let s = literal.strip_prefix('\'').unwrap_or(literal);
                let s = s.strip_suffix('\'').unwrap_or(s);
                Some(Value::String(s.to_string()))
            }
        }
    }

    /// Type of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Integer(_) => FieldType::Integer,
            Value::Number(_) => FieldType::Number,
            Value::String(_) => FieldType::String,
            Value::Boolean(_) => FieldType::Boolean,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => f.write_str(if *b { "True" } else { "False" }),
        }
    }
}

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name, unique within its table
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
}

impl ColumnDef {
    /// Create a column definition. Names are checked by [`TableSchema::new`].
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered column definition for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Build a schema, validating names, uniqueness and the column limit.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        if columns.is_empty() {
            return Err(SchemaError::NoColumns(name).into());
        }
        if columns.len() > MAX_COLUMNS {
            return Err(SchemaError::TooManyColumns {
                limit: MAX_COLUMNS,
                got: columns.len(),
            }
            .into());
        }
        for (i, column) in columns.iter().enumerate() {
            validate_name(&column.name)?;
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()).into());
            }
        }

        Ok(Self { name, columns })
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a validated schema; provided for clippy's sake
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by exact name
    pub fn find_column(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }

    /// Like [`TableSchema::find_column`] but failing with a schema error
    pub fn resolve_column(&self, column: &str) -> Result<usize> {
        self.find_column(column).ok_or_else(|| {
            SchemaError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            }
            .into()
        })
    }

    /// Convert a literal for the column at `position`
    pub fn convert(&self, position: usize, literal: &str) -> Result<Value> {
        let column = &self.columns[position];
        Value::parse(literal, column.field_type).ok_or_else(|| {
            SchemaError::InvalidLiteral {
                column: column.name.clone(),
                literal: literal.to_string(),
            }
            .into()
        })
    }
}

/// Names must be 1..=127 bytes of `[A-Za-z0-9_]`; table names double as
/// file names.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()).into())
    }
}

/// One row of a table, meaningless without its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Row index, the first field of the stored line
    pub index: i64,
    /// One value per schema column, in column order
    pub values: Vec<Value>,
}

impl Row {
    /// Create a row from its index and values
    pub fn new(index: i64, values: Vec<Value>) -> Self {
        Self { index, values }
    }

    /// A row holding the default value of every column
    pub fn defaults(index: i64, schema: &TableSchema) -> Self {
        Self {
            index,
            values: schema
                .columns()
                .iter()
                .map(|c| Value::default_for(c.field_type))
                .collect(),
        }
    }
}
