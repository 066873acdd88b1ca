//! Query Types - operators, filters and ordering

use std::fmt;

use crate::model::{Entity, Value};

/// Comparison operators supported by datastore filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl QueryOperator {
    /// Parse the textual operator used in filter expressions
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(QueryOperator::Equal),
            "!=" | "<>" => Some(QueryOperator::NotEqual),
            ">" => Some(QueryOperator::GreaterThan),
            ">=" => Some(QueryOperator::GreaterThanOrEqual),
            "<" => Some(QueryOperator::LessThan),
            "<=" => Some(QueryOperator::LessThanOrEqual),
            _ => None,
        }
    }

    /// Whether `candidate` satisfies `candidate <op> operand`
    pub fn evaluate(&self, candidate: &Value, operand: &Value) -> bool {
        use std::cmp::Ordering::*;

        let ordering = candidate.compare(operand);
        match self {
            QueryOperator::Equal => ordering == Some(Equal),
            QueryOperator::NotEqual => ordering != Some(Equal),
            QueryOperator::GreaterThan => ordering == Some(Greater),
            QueryOperator::GreaterThanOrEqual => matches!(ordering, Some(Greater | Equal)),
            QueryOperator::LessThan => ordering == Some(Less),
            QueryOperator::LessThanOrEqual => matches!(ordering, Some(Less | Equal)),
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
        }
    }
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Single filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub property: String,
    pub operator: QueryOperator,
    pub value: Value,
}

impl Filter {
    /// Whether an entity satisfies the condition. Container properties
    /// match when any element does.
    pub fn matches(&self, entity: &Entity) -> bool {
        match entity.get(&self.property) {
            Value::List(items) if !matches!(self.value, Value::List(_)) => {
                items.iter().any(|item| self.operator.evaluate(item, &self.value))
            }
            value => self.operator.evaluate(value, &self.value),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.property, self.operator, self.value)
    }
}

/// Sort order on one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub property: String,
    pub direction: OrderDirection,
}

impl Order {
    /// Parse `name` or `-name` (descending)
    pub fn parse(expression: &str) -> Self {
        match expression.strip_prefix('-') {
            Some(property) => Self {
                property: property.to_string(),
                direction: OrderDirection::Desc,
            },
            None => Self {
                property: expression.to_string(),
                direction: OrderDirection::Asc,
            },
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            OrderDirection::Asc => write!(f, "{}", self.property),
            OrderDirection::Desc => write!(f, "-{}", self.property),
        }
    }
}
