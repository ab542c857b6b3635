//! # FlatQL Core
//!
//! Core types for the FlatQL query engine: the data model, the query lexer
//! and keyword classifier, and predicate evaluation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod format_version;
pub mod predicate;
pub mod query;
pub mod types;

pub use error::{Error, Result, SchemaError};
pub use predicate::Predicate;
pub use query::{classify_query, classify_type, tokenize, Operator, QueryType, Token};
pub use types::{ColumnDef, FieldType, Row, TableSchema, Value, MAX_COLUMNS, MAX_NAME_LEN};
