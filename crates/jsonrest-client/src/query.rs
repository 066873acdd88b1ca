//! Search query builder speaking the filter/order/cursor/limit grammar

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::JsonClient;
use crate::error::{ClientError, ClientResult};

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub models: Vec<Value>,
    /// Pass to [`Query::with_cursor`] to fetch the next page; `None` once
    /// the search is exhausted
    pub cursor: Option<String>,
    pub next_page_url: Option<String>,
}

impl SearchPage {
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }
}

fn filter_prefix(operator: &str) -> Option<&'static str> {
    match operator {
        "=" => Some("feq_"),
        ">" => Some("fgt_"),
        ">=" => Some("fge_"),
        "<" => Some("flt_"),
        "<=" => Some("fle_"),
        "!=" => Some("fne_"),
        _ => None,
    }
}

/// Search over one model; parameters are sent in the order they are added
#[derive(Debug, Clone)]
pub struct Query<'a> {
    client: &'a JsonClient,
    params: Vec<(String, String)>,
}

impl<'a> Query<'a> {
    pub fn new(client: &'a JsonClient) -> Self {
        Self {
            client,
            params: Vec::new(),
        }
    }

    /// Add a filter written as `"property operator"`, e.g. `"width >="`.
    ///
    /// Supported operators: `=`, `!=`, `<`, `<=`, `>`, `>=`.
    pub fn filter(mut self, expression: &str, value: impl ToString) -> ClientResult<Self> {
        let (property, operator) = expression.trim().split_once(' ').ok_or_else(|| {
            ClientError::OperatorNotFound(format!(
                "Operator not found in expression '{}'. (Are you missing a space between the property name and the operator?)",
                expression
            ))
        })?;

        let prefix = filter_prefix(operator.trim())
            .ok_or_else(|| ClientError::OperatorNotFound(format!("Unsupported operator: {}", operator.trim())))?;
        self.params
            .push((format!("{}{}", prefix, property.trim()), value.to_string()));
        Ok(self)
    }

    pub fn order(mut self, property: &str, descending: bool) -> Self {
        let value = if descending {
            format!("-{}", property)
        } else {
            property.to_string()
        };
        self.params.push(("order".to_string(), value));
        self
    }

    /// Resume after the page that returned `cursor`
    pub fn with_cursor(mut self, cursor: &str) -> Self {
        self.params.push(("cursor".to_string(), cursor.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Fetch one page of at most `limit` objects (server default when `None`)
    pub async fn fetch(mut self, limit: Option<usize>) -> ClientResult<SearchPage> {
        if let Some(limit) = limit {
            self.params.push(("limit".to_string(), limit.to_string()));
        }
        self.client.search(&self.params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> JsonClient {
        JsonClient::new("Fruit", "http://localhost:8080/rest/").unwrap()
    }

    #[test]
    fn test_filter_operators_map_to_prefixes() {
        let client = client();
        let query = client
            .all()
            .filter("name =", "Banana")
            .unwrap()
            .filter("width >=", 3)
            .unwrap()
            .filter("width !=", 9)
            .unwrap()
            .order("width", true)
            .with_cursor("abc");

        let expected: Vec<(String, String)> = [
            ("feq_name", "Banana"),
            ("fge_width", "3"),
            ("fne_width", "9"),
            ("order", "-width"),
            ("cursor", "abc"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(query.params(), expected.as_slice());
    }

    #[test]
    fn test_filter_rejects_bad_expressions() {
        let client = client();

        let missing = client.all().filter("name=", "Banana").unwrap_err();
        assert!(matches!(missing, ClientError::OperatorNotFound(ref message) if message.contains("missing a space")));

        let unsupported = client.all().filter("name ~", "Ban").unwrap_err();
        assert_eq!(unsupported.to_string(), "Unsupported operator: ~");
    }
}
