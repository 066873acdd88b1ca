//! CRUD client for one model of a jsonrest API

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::query::{Query, SearchPage};

/// Response envelope as sent by the server
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Value,
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Client bound to one model, e.g. `Fruit` under `http://host/rest/`
#[derive(Debug, Clone)]
pub struct JsonClient {
    http: Client,
    model_name: String,
    api_root: Url,
    headers: HeaderMap,
    credentials: Option<(String, String)>,
}

impl JsonClient {
    /// `api_root` is the URL of the API prefix, e.g. `http://localhost:8080/rest/`
    pub fn new(model_name: impl Into<String>, api_root: &str) -> ClientResult<Self> {
        let root = if api_root.ends_with('/') {
            api_root.to_string()
        } else {
            format!("{}/", api_root)
        };

        Ok(Self {
            http: Client::builder().build()?,
            model_name: model_name.into(),
            api_root: Url::parse(&root)?,
            headers: HeaderMap::new(),
            credentials: None,
        })
    }

    /// Send `name: value` with every call
    pub fn with_header(mut self, name: &str, value: &str) -> ClientResult<Self> {
        let invalid = |message: String| ClientError::InvalidHeader {
            name: name.to_string(),
            message,
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Authenticate every call with HTTP Basic credentials
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// URL of the model collection, or of one object when `id` is given
    pub fn api_url(&self, id: Option<&str>) -> ClientResult<Url> {
        let path = match id {
            Some(id) => format!("{}/{}", self.model_name, id),
            None => self.model_name.clone(),
        };
        Ok(self.api_root.join(&path)?)
    }

    /// Create an object; returns the created object
    pub async fn create(&self, data: &Value) -> ClientResult<Value> {
        self.call(Method::POST, self.api_url(None)?, Some(data), &[]).await
    }

    pub async fn read(&self, id: &str) -> ClientResult<Value> {
        self.call(Method::GET, self.api_url(Some(id))?, None, &[]).await
    }

    /// Update an object; returns the updated object
    pub async fn update(&self, id: &str, data: &Value) -> ClientResult<Value> {
        self.call(Method::PUT, self.api_url(Some(id))?, Some(data), &[]).await
    }

    /// Delete an object; returns the id or key it was addressed by
    pub async fn delete(&self, id: &str) -> ClientResult<Value> {
        self.call(Method::DELETE, self.api_url(Some(id))?, None, &[]).await
    }

    /// Start a search over all objects of the model
    pub fn all(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Run one search call with raw query-string parameters
    pub async fn search(&self, params: &[(String, String)]) -> ClientResult<SearchPage> {
        let data = self
            .call(Method::GET, self.api_url(Some("search"))?, None, params)
            .await?;
        serde_json::from_value(data).map_err(|e| ClientError::ApiCallFailed {
            status: StatusCode::OK.as_u16(),
            error_type: None,
            message: format!("unexpected search response: {}", e),
        })
    }

    async fn call(
        &self,
        method: Method,
        url: Url,
        payload: Option<&Value>,
        params: &[(String, String)],
    ) -> ClientResult<Value> {
        debug!(method = %method, url = %url, "Calling API");

        let mut request = self
            .http
            .request(method, url)
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, "application/json; charset=utf-8");
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let envelope = serde_json::from_str::<Envelope>(&body).ok();

        match status {
            StatusCode::UNAUTHORIZED => return Err(ClientError::AuthenticationRequired),
            StatusCode::FORBIDDEN => return Err(ClientError::Forbidden),
            StatusCode::NOT_FOUND => {
                let message = envelope.and_then(|envelope| envelope.message).unwrap_or(body);
                return Err(ClientError::ObjectMissing(message));
            }
            _ => {}
        }

        let Some(envelope) = envelope else {
            return Err(ClientError::ApiCallFailed {
                status: status.as_u16(),
                error_type: None,
                message: body,
            });
        };

        if envelope.status != "success" {
            return Err(match envelope.error_type.as_deref() {
                Some("ObjectMissingError") => ClientError::ObjectMissing(envelope.message.unwrap_or_default()),
                Some("ForbiddenError") | Some("AuthenticationFailedError") => ClientError::Forbidden,
                _ => ClientError::ApiCallFailed {
                    status: status.as_u16(),
                    error_type: envelope.error_type,
                    message: envelope.message.unwrap_or(body),
                },
            });
        }

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = JsonClient::new("Fruit", "http://localhost:8080/rest").unwrap();
        assert_eq!(
            client.api_url(None).unwrap().as_str(),
            "http://localhost:8080/rest/Fruit"
        );
        assert_eq!(
            client.api_url(Some("42")).unwrap().as_str(),
            "http://localhost:8080/rest/Fruit/42"
        );
    }

    #[test]
    fn test_invalid_root_and_header() {
        assert!(matches!(
            JsonClient::new("Fruit", "not a url"),
            Err(ClientError::InvalidUrl(_))
        ));

        let client = JsonClient::new("Fruit", "http://localhost/rest/").unwrap();
        assert!(matches!(
            client.with_header("bad header", "x"),
            Err(ClientError::InvalidHeader { .. })
        ));
    }
}
