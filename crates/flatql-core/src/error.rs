//! Error types for FlatQL.

use crate::query::lexer::ParseError;
use std::fmt;

/// The main error type for FlatQL operations.
#[derive(Debug)]
pub enum Error {
    /// The query text could not be tokenized
    Parse(ParseError),

    /// Unknown command or type keyword
    Classification(String),

    /// The statement conflicts with a table schema
    Schema(SchemaError),

    /// Storage engine error (corrupt catalog, unreadable row, ...)
    Storage(String),

    /// I/O error
    Io(std::io::Error),

    /// A condition could not be evaluated against a stored value
    Evaluation(String),
}

/// Schema-level failures: the statement is well formed but does not fit the
/// table it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A table with this name already exists
    DuplicateTable(String),
    /// No table with this name exists
    UnknownTable(String),
    /// The table has no column with this name
    UnknownColumn {
        /// Table the statement targets
        table: String,
        /// Column that was not found
        column: String,
    },
    /// A column name appears twice in a definition or an INSERT
    DuplicateColumn(String),
    /// More than 128 columns, or more assignments than columns
    TooManyColumns {
        /// Maximum allowed
        limit: usize,
        /// Number supplied
        got: usize,
    },
    /// A table must declare at least one column
    NoColumns(String),
    /// Name is empty, too long, or contains characters outside `[A-Za-z0-9_]`
    InvalidName(String),
    /// An INSERT token that is not an assignment
    ExpectedAssignment(String),
    /// A literal that cannot be converted to the column type
    InvalidLiteral {
        /// Column the literal was meant for
        column: String,
        /// Offending literal
        literal: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateTable(name) => {
                write!(f, "there is a table with the same name, cannot create table `{}`", name)
            }
            SchemaError::UnknownTable(name) => write!(f, "no table named `{}`", name),
            SchemaError::UnknownColumn { table, column } => {
                write!(f, "no column `{}` in table `{}`", column, table)
            }
            SchemaError::DuplicateColumn(name) => write!(f, "column `{}` given more than once", name),
            SchemaError::TooManyColumns { limit, got } => {
                write!(f, "you specified more columns than available ({} > {})", got, limit)
            }
            SchemaError::NoColumns(name) => write!(f, "table `{}` must have at least one column", name),
            SchemaError::InvalidName(name) => write!(f, "invalid name `{}`", name),
            SchemaError::ExpectedAssignment(column) => {
                write!(f, "invalid operator for expression on `{}`, expected assignment", column)
            }
            SchemaError::InvalidLiteral { column, literal } => {
                write!(f, "invalid value `{}` for column `{}`", literal, column)
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "cannot parse query: {}", e),
            Error::Classification(msg) => write!(f, "Classification error: {}", msg),
            Error::Schema(e) => write!(f, "Schema error: {}", e),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Evaluation(msg) => write!(f, "Evaluation error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

/// A specialized `Result` type for FlatQL operations.
pub type Result<T> = std::result::Result<T, Error>;
