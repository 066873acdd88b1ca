//! Query Builder - filters, ordering, cursor and page size for one fetch

use std::sync::Arc;

use super::cursor::Cursor;
use super::types::*;
use crate::model::{ModelType, Value};

/// Query against a single model type
#[derive(Debug, Clone)]
pub struct Query {
    model: Arc<ModelType>,
    filters: Vec<Filter>,
    order: Option<Order>,
    cursor: Option<Cursor>,
    limit: Option<usize>,
}

impl Query {
    /// Create a query returning every entity of `model`
    pub fn new(model: Arc<ModelType>) -> Self {
        Self {
            model,
            filters: Vec::new(),
            order: None,
            cursor: None,
            limit: None,
        }
    }

    /// Add a filter; all filters must hold
    pub fn filter(mut self, property: &str, operator: QueryOperator, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            property: property.to_string(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Add an equality filter
    pub fn filter_eq(self, property: &str, value: impl Into<Value>) -> Self {
        self.filter(property, QueryOperator::Equal, value)
    }

    /// Sort by `property`; replaces any earlier ordering
    pub fn order(mut self, property: &str, direction: OrderDirection) -> Self {
        self.order = Some(Order {
            property: property.to_string(),
            direction,
        });
        self
    }

    /// Sort by an expression of the form `name` or `-name`
    pub fn order_by(mut self, expression: &str) -> Self {
        self.order = Some(Order::parse(expression));
        self
    }

    /// Resume after the position a previous fetch ended at
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Fetch at most `count` entities
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn model(&self) -> &Arc<ModelType> {
        &self.model
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn limit_count(&self) -> Option<usize> {
        self.limit
    }
}
