/// Command and type keyword classification
///
/// Both tables are sorted by keyword so lookups are a binary search.
use crate::types::FieldType;

/// Statement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// `DATASET`
    Create,
    /// `SELECT`
    Select,
    /// `DELETE`
    Delete,
    /// `INSERT_INTO`
    Insert,
    /// `UPDATE`
    Update,
    /// Unknown command keyword
    Invalid,
}

// Must stay sorted by keyword.
const QUERY_TYPES: &[(&str, QueryType)] = &[
    ("DATASET", QueryType::Create),
    ("DELETE", QueryType::Delete),
    ("INSERT_INTO", QueryType::Insert),
    ("SELECT", QueryType::Select),
    ("UPDATE", QueryType::Update),
];

// Must stay sorted by keyword.
const DATA_TYPES: &[(&str, FieldType)] = &[
    ("BOOLEAN", FieldType::Boolean),
    ("INTEGER", FieldType::Integer),
    ("NUMBER", FieldType::Number),
    ("STRING", FieldType::String),
];

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .binary_search_by(|(keyword, _)| (*keyword).cmp(name))
        .ok()
        .map(|i| table[i].1)
}

/// Map a command keyword to its statement kind; unknown names are `Invalid`.
pub fn classify_query(name: &str) -> QueryType {
    lookup(QUERY_TYPES, name).unwrap_or(QueryType::Invalid)
}

/// Map a type keyword to a column type.
pub fn classify_type(name: &str) -> Option<FieldType> {
    lookup(DATA_TYPES, name)
}
