//! Statement executors
//!
//! Each statement is tokenized, classified, checked against its table
//! schema, and only then allowed to touch the table file. No state survives
//! between statements.

use flatql_core::{
    classify_query, classify_type, tokenize, ColumnDef, Error, Operator, Predicate, QueryType,
    Result, Row, SchemaError, TableSchema, Token, Value,
};
use flatql_storage::{format, Storage};
use std::fmt;

/// Outcome of one statement
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// `DATASET` created a table
    Created { table: String },
    /// `INSERT_INTO` appended one row
    Inserted { table: String, index: i64 },
    /// `SELECT` result rows, in file order
    Rows { schema: TableSchema, rows: Vec<Row> },
    /// `UPDATE` modified `count` rows
    Updated { table: String, count: usize },
    /// `DELETE` removed `count` rows
    Deleted { table: String, count: usize },
}

impl ExecutionResult {
    /// Rows of a `SELECT`, empty for every other statement
    pub fn rows(&self) -> &[Row] {
        match self {
            ExecutionResult::Rows { rows, .. } => rows,
            _ => &[],
        }
    }
}

fn write_cell(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Integer(_) | Value::Number(_) => write!(f, "{:>10}|\t", value.to_string()),
        Value::String(_) | Value::Boolean(_) => write!(f, "{:<10}|\t", value.to_string()),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "row"
    } else {
        "rows"
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionResult::Created { table } => write!(f, "table `{}` created", table),
            ExecutionResult::Inserted { table, index } => {
                write!(f, "inserted row {} into `{}`", index, table)
            }
            ExecutionResult::Updated { table, count } => {
                write!(f, "updated {} {} in `{}`", count, plural(*count), table)
            }
            ExecutionResult::Deleted { table, count } => {
                write!(f, "deleted {} {} from `{}`", count, plural(*count), table)
            }
            ExecutionResult::Rows { schema, rows } => {
                for column in schema.columns() {
                    write!(f, "{:<10}|\t", column.name)?;
                }
                writeln!(f)?;
                for row in rows {
                    for value in &row.values {
                        write_cell(f, value)?;
                    }
                    writeln!(f)?;
                }
                write!(f, "({} {})", rows.len(), plural(rows.len()))
            }
        }
    }
}

fn is_assignment(token: &Token) -> bool {
    matches!(token.operator, Operator::Assign | Operator::Equal)
}

/// Split the tokens of an UPDATE into conditions and assignments.
///
/// With at least one explicit assignment (`:` or an implied one) every
/// assignment token is an assignment and everything else a condition.
/// Otherwise only a final `=` token assigns and every earlier `=` is an
/// equality filter; assigning several columns needs `:`.
fn split_update(tokens: &[Token]) -> (Vec<&Token>, Vec<&Token>) {
    if tokens.iter().any(|t| t.operator == Operator::Assign) {
        return tokens.iter().partition(|t| t.operator != Operator::Assign);
    }

    match tokens.split_last() {
        Some((last, conditions)) if last.operator == Operator::Equal => {
            (conditions.iter().collect(), vec![last])
        }
        _ => (tokens.iter().collect(), Vec::new()),
    }
}

/// Runs statements against one storage handle
pub struct Executor<'a> {
    storage: &'a Storage,
}

impl<'a> Executor<'a> {
    /// Create new executor
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Tokenize, classify and run one statement.
    pub fn execute(&self, query: &str) -> Result<ExecutionResult> {
        let tokens = tokenize(query)?;
        let Some((head, rest)) = tokens.split_first() else {
            return Err(Error::Classification("empty statement".to_string()));
        };

        let table = head.value.as_str();
        tracing::debug!(command = %head.keyword, table, tokens = tokens.len(), "executing");

        match classify_query(&head.keyword) {
            QueryType::Create => self.create(table, rest),
            QueryType::Select => self.select(table, rest),
            QueryType::Insert => self.insert(table, rest),
            QueryType::Update => self.update(table, rest),
            QueryType::Delete => self.delete(table, rest),
            QueryType::Invalid => Err(Error::Classification(format!(
                "unknown command `{}`",
                head.keyword
            ))),
        }
    }

    fn schema(&self, table: &str) -> Result<TableSchema> {
        self.storage
            .catalog()
            .find_table(table)?
            .ok_or_else(|| SchemaError::UnknownTable(table.to_string()).into())
    }

    /// Convert a literal for a column and make sure the table file can hold it
    fn convert(&self, schema: &TableSchema, position: usize, literal: &str) -> Result<Value> {
        let value = schema.convert(position, literal)?;
        format::check_field(&schema.columns()[position], &value)?;
        Ok(value)
    }

    /// Resolve assignment tokens to `(column, value)` pairs
    fn assignments(&self, schema: &TableSchema, tokens: &[&Token]) -> Result<Vec<(usize, Value)>> {
        let mut resolved: Vec<(usize, Value)> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if !is_assignment(token) {
                return Err(SchemaError::ExpectedAssignment(token.keyword.clone()).into());
            }
            let position = schema.resolve_column(&token.keyword)?;
            if resolved.iter().any(|(p, _)| *p == position) {
                return Err(SchemaError::DuplicateColumn(token.keyword.clone()).into());
            }
            resolved.push((position, self.convert(schema, position, &token.value)?));
        }
        Ok(resolved)
    }

    fn create(&self, table: &str, columns: &[Token]) -> Result<ExecutionResult> {
        if self.storage.catalog().find_table(table)?.is_some() {
            return Err(SchemaError::DuplicateTable(table.to_string()).into());
        }

        let columns = columns
            .iter()
            .map(|token| -> Result<ColumnDef> {
                if !is_assignment(token) {
                    return Err(SchemaError::ExpectedAssignment(token.keyword.clone()).into());
                }
                let field_type = classify_type(&token.value).ok_or_else(|| {
                    Error::Classification(format!(
                        "unknown type `{}` for column `{}`",
                        token.value, token.keyword
                    ))
                })?;
                Ok(ColumnDef::new(token.keyword.as_str(), field_type))
            })
            .collect::<Result<Vec<_>>>()?;

        let schema = TableSchema::new(table, columns)?;
        self.storage.catalog().create_table(&schema)?;
        self.storage.tables().create(&schema)?;

        Ok(ExecutionResult::Created {
            table: table.to_string(),
        })
    }

    fn select(&self, table: &str, conditions: &[Token]) -> Result<ExecutionResult> {
        let schema = self.schema(table)?;
        let predicate = Predicate::compile(&schema, conditions)?;
        let filter = (!predicate.is_empty()).then_some(&predicate);

        let rows = self.storage.tables().scan(&schema, filter)?;
        Ok(ExecutionResult::Rows { schema, rows })
    }

    fn insert(&self, table: &str, tokens: &[Token]) -> Result<ExecutionResult> {
        let schema = self.schema(table)?;
        if tokens.len() > schema.len() {
            return Err(SchemaError::TooManyColumns {
                limit: schema.len(),
                got: tokens.len(),
            }
            .into());
        }

        let tokens: Vec<&Token> = tokens.iter().collect();
        let mut row = Row::defaults(0, &schema);
        for (position, value) in self.assignments(&schema, &tokens)? {
            row.values[position] = value;
        }

        let tables = self.storage.tables();
        row.index = tables.next_index(&schema)?;
        tables.append(&schema, &row)?;

        Ok(ExecutionResult::Inserted {
            table: table.to_string(),
            index: row.index,
        })
    }

    fn update(&self, table: &str, tokens: &[Token]) -> Result<ExecutionResult> {
        let schema = self.schema(table)?;
        let (conditions, assignments) = split_update(tokens);
        if assignments.is_empty() {
            let keyword = tokens.last().map_or(table, |t| t.keyword.as_str());
            return Err(SchemaError::ExpectedAssignment(keyword.to_string()).into());
        }

        let predicate = Predicate::compile(&schema, conditions)?;
        let assignments = self.assignments(&schema, &assignments)?;

        let tables = self.storage.tables();
        let mut rows = tables.scan(&schema, None)?;
        let mut count = 0;
        for row in rows.iter_mut() {
            if predicate.matches(row)? {
                for (position, value) in &assignments {
                    row.values[*position] = value.clone();
                }
                count += 1;
            }
        }

        // nothing matched: leave the file exactly as it is
        if count > 0 {
            tables.rewrite(&schema, &rows)?;
        }

        Ok(ExecutionResult::Updated {
            table: table.to_string(),
            count,
        })
    }

    fn delete(&self, table: &str, conditions: &[Token]) -> Result<ExecutionResult> {
        let schema = self.schema(table)?;
        let predicate = Predicate::compile(&schema, conditions)?;

        let tables = self.storage.tables();
        let rows = tables.scan(&schema, None)?;
        let total = rows.len();
        let mut kept = Vec::with_capacity(total);
        for row in rows {
            if !predicate.matches(&row)? {
                kept.push(row);
            }
        }

        let count = total - kept.len();
        if count > 0 {
            tables.rewrite(&schema, &kept)?;
        }

        Ok(ExecutionResult::Deleted {
            table: table.to_string(),
            count,
        })
    }
}
