//! Row filtering.
//!
//! A condition compares the stored value (left) with the token's literal
//! (right): `age>25` keeps rows whose `age` is greater than 25.

use crate::error::{Error, Result};
use crate::query::lexer::{Operator, Token};
use crate::types::{FieldType, Row, TableSchema, Value};
use std::cmp::Ordering;

fn unsupported(operator: Operator, field_type: FieldType) -> Error {
    Error::Evaluation(format!(
        "operator `{}` is not supported for {} values",
        operator, field_type
    ))
}

fn apply(ordering: Option<Ordering>, operator: Operator) -> Option<bool> {
    let ordering = ordering?;
    match operator {
        Operator::Equal => Some(ordering == Ordering::Equal),
        Operator::NotEqual => Some(ordering != Ordering::Equal),
        Operator::GreaterThan => Some(ordering == Ordering::Greater),
        Operator::LessThan => Some(ordering == Ordering::Less),
        Operator::GreaterOrEqual => Some(ordering != Ordering::Less),
        Operator::LessOrEqual => Some(ordering != Ordering::Greater),
        Operator::Assign | Operator::Invalid => None,
    }
}

/// Compare a stored value against one condition token.
pub fn matches(condition: &Token, value: &Value, field_type: FieldType) -> Result<bool> {
    let operator = condition.operator;
    if !operator.is_comparison() {
        return Err(unsupported(operator, field_type));
    }

    let literal = condition.value.as_str();
    let not_comparable = || {
        Error::Evaluation(format!(
            "`{}` cannot be compared with {} column `{}`",
            literal, field_type, condition.keyword
        ))
    };

    match (field_type, value) {
        (FieldType::Integer, Value::Integer(stored)) => {
            let rhs: i64 = literal.trim().parse().map_err(|_| not_comparable())?;
            apply(Some(stored.cmp(&rhs)), operator).ok_or_else(|| unsupported(operator, field_type))
        }
        (FieldType::Number, Value::Number(stored)) => {
            let rhs: f64 = literal.trim().parse().map_err(|_| not_comparable())?;
            // NaN compares false under every operator except `!=`
            match stored.partial_cmp(&rhs) {
                None => Ok(operator == Operator::NotEqual),
                ordering => apply(ordering, operator).ok_or_else(|| unsupported(operator, field_type)),
            }
        }
        (FieldType::String, Value::String(stored)) => {
            let rhs = literal.strip_prefix('\'').unwrap_or(literal);
            let rhs = rhs.strip_suffix('\'').unwrap_or(rhs);
            apply(Some(stored.as_bytes().cmp(rhs.as_bytes())), operator)
                .ok_or_else(|| unsupported(operator, field_type))
        }
        // every relational operator collapses to equality with `True`
        (FieldType::Boolean, Value::Boolean(stored)) => Ok((literal == "True") == *stored),
        _ => Err(Error::Evaluation(format!(
            "column `{}` is declared {} but holds a {} value",
            condition.keyword,
            field_type,
            value.field_type()
        ))),
    }
}

/// A conjunction of conditions with their columns resolved against one
/// schema.
#[derive(Debug, Clone)]
pub struct Predicate {
    conditions: Vec<(usize, FieldType, Token)>,
}

impl Predicate {
    /// Resolve every condition's column. Fails on the first unknown column
    /// or non-comparison operator.
    pub fn compile<'a, I>(schema: &TableSchema, conditions: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Token>,
    {
        let conditions = conditions
            .into_iter()
            .map(|token| {
                let position = schema.resolve_column(&token.keyword)?;
                let field_type = schema.columns()[position].field_type;
                if !token.operator.is_comparison() {
                    return Err(unsupported(token.operator, field_type));
                }
                Ok((position, field_type, token.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { conditions })
    }

    /// A predicate with no conditions matches every row
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Evaluate the conjunction against a row.
    pub fn matches(&self, row: &Row) -> Result<bool> {
        for (position, field_type, token) in &self.conditions {
            let value = row.values.get(*position).ok_or_else(|| {
                Error::Evaluation(format!(
                    "row {} has no value for column `{}`",
                    row.index, token.keyword
                ))
            })?;
            if !matches(token, value, *field_type)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
