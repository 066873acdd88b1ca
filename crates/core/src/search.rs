//! Query translator and paginator
//!
//! Search requests use a flat query-string grammar:
//!
//! - `feq_`, `fne_`, `flt_`, `fle_`, `fgt_`, `fge_` followed by a property
//!   name filter on that property (`feq_name=Banana`)
//! - `order=name` sorts ascending, `order=-name` descending
//! - `limit=N` sets the page size
//! - `cursor=...` resumes after a previous page
//!
//! A page holding exactly `limit` rows carries a cursor and a ready-made
//! URL for the next page; a shorter page ends the search.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::form_urlencoded;

use jsonrest_orm::{Cursor, Datastore, Filter, ModelType, Order, Query, QueryOperator};

use crate::converter::coerce_query_value;
use crate::errors::{ApiError, ApiResult};
use crate::model_converter::{ConversionContext, JsonMap};
use crate::registry::RegisteredModel;

/// Page size when the request gives none
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page size accepted by default
pub const MAX_LIMIT: usize = 1000;

static FILTER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(f.._)(.+)$").expect("valid filter pattern"));

fn filter_operator(prefix: &str) -> Option<QueryOperator> {
    match prefix {
        "feq_" => Some(QueryOperator::Equal),
        "fne_" => Some(QueryOperator::NotEqual),
        "flt_" => Some(QueryOperator::LessThan),
        "fle_" => Some(QueryOperator::LessThanOrEqual),
        "fgt_" => Some(QueryOperator::GreaterThan),
        "fge_" => Some(QueryOperator::GreaterThanOrEqual),
        _ => None,
    }
}

/// Page size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// A parsed search request
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub cursor: Option<Cursor>,
    pub limit: usize,
    /// Filter, order and limit parameters to repeat in the next-page URL
    pub next_page_params: Vec<(String, String)>,
}

impl QueryPlan {
    /// Parse query-string parameters for a search over `model`.
    ///
    /// Unknown parameters are ignored. Filters and orderings must name a
    /// declared property; filter values go through the property's converter.
    pub fn parse(
        ctx: &ConversionContext<'_>,
        model: &ModelType,
        params: &[(String, String)],
        limits: SearchLimits,
    ) -> ApiResult<Self> {
        let mut plan = QueryPlan {
            filters: Vec::new(),
            order: None,
            cursor: None,
            limit: limits.default_limit,
            next_page_params: Vec::new(),
        };

        for (name, raw) in params {
            if let Some(captures) = FILTER_PATTERN.captures(name) {
                let (prefix, property_name) = (&captures[1], &captures[2]);
                let Some(operator) = filter_operator(prefix) else {
                    debug!(parameter = %name, "Ignoring unknown filter operator");
                    continue;
                };

                let property = model.property(property_name).ok_or_else(|| {
                    ApiError::invalid_parameter(name, format!("{} has no property {}", model.name(), property_name))
                })?;
                let value = ctx
                    .converters
                    .deserialize_scalar(property, &coerce_query_value(property, raw), ctx.resolver)
                    .map_err(|e| ApiError::type_conversion(property_name, e.0))?;

                plan.filters.push(Filter {
                    property: property_name.to_string(),
                    operator,
                    value,
                });
                plan.next_page_params.push((name.clone(), raw.clone()));
                continue;
            }

            match name.as_str() {
                "order" => {
                    let order = Order::parse(raw);
                    if model.property(&order.property).is_none() {
                        return Err(ApiError::invalid_parameter(
                            "order",
                            format!("{} has no property {}", model.name(), order.property),
                        ));
                    }
                    plan.order = Some(order);
                    plan.next_page_params.push((name.clone(), raw.clone()));
                }
                "cursor" => {
                    plan.cursor = Some(Cursor::new(raw.clone()));
                }
                "limit" => {
                    plan.limit = parse_limit(raw, limits.max_limit)?;
                    plan.next_page_params.push((name.clone(), raw.clone()));
                }
                _ => debug!(parameter = %name, "Ignoring search parameter"),
            }
        }

        Ok(plan)
    }

    /// Datastore query for this plan
    pub fn to_query(&self, registered: &RegisteredModel) -> Query {
        let mut query = Query::new(registered.model_type.clone()).limit(self.limit);
        for filter in &self.filters {
            query = query.filter(&filter.property, filter.operator, filter.value.clone());
        }
        if let Some(order) = &self.order {
            query = query.order(&order.property, order.direction);
        }
        if let Some(cursor) = &self.cursor {
            query = query.with_cursor(cursor.clone());
        }
        query
    }

    /// URL of the page after the one ending at `cursor`
    pub fn next_page_url(&self, page_url: &str, cursor: &Cursor) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.next_page_params {
            query.append_pair(name, value);
        }
        query.append_pair("cursor", cursor.as_str());
        format!("{}?{}", page_url, query.finish())
    }
}

fn parse_limit(raw: &str, max_limit: usize) -> ApiResult<usize> {
    let limit: usize = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_parameter("limit", "limit parameter must be an integer"))?;

    if limit == 0 || limit > max_limit {
        return Err(ApiError::invalid_parameter(
            "limit",
            format!("limit must be between 1 and {}", max_limit),
        ));
    }
    Ok(limit)
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub models: Vec<JsonMap>,
    /// Continuation cursor; `None` when this page ended the search
    pub cursor: Option<String>,
    pub next_page_url: Option<String>,
}

/// Run `plan` against `store` and serialize the rows.
///
/// `page_url` is the absolute URL of the search endpoint, used to build
/// `next_page_url`.
pub async fn execute(
    ctx: &ConversionContext<'_>,
    store: &dyn Datastore,
    registered: &RegisteredModel,
    plan: &QueryPlan,
    page_url: &str,
) -> ApiResult<PageResult> {
    let results = store.fetch(&plan.to_query(registered)).await?;

    let cursor = if results.rows.len() == plan.limit {
        results.cursor
    } else {
        None
    };

    let models = results
        .rows
        .iter()
        .map(|entity| registered.converter.read(ctx, entity))
        .collect::<ApiResult<Vec<_>>>()?;

    debug!(
        model = %registered.name,
        rows = models.len(),
        more = cursor.is_some(),
        "Search page"
    );

    Ok(PageResult {
        models,
        next_page_url: cursor.as_ref().map(|cursor| plan.next_page_url(page_url, cursor)),
        cursor: cursor.map(|cursor| cursor.as_str().to_string()),
    })
}
