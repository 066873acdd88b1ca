//! Shared fixtures for the REST surface tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonrest_core::{ModelRegistry, Namespace};
use jsonrest_http::{build_router, ApiState, HttpConfig};
use jsonrest_orm::{MemoryDatastore, ModelType, PropertyDescriptor, PropertyType};
use serde_json::Value;
use tower::ServiceExt;

pub fn fruit_type() -> Arc<ModelType> {
    ModelType::new("produce", "Fruit")
        .with_property(PropertyDescriptor::string("name").required())
        .with_property(PropertyDescriptor::integer("width"))
        .with_property(PropertyDescriptor::geo_pt("location"))
        .with_property(PropertyDescriptor::list("tags", PropertyType::STRING))
        .with_property(PropertyDescriptor::date("picked"))
        .with_property(PropertyDescriptor::reference("basket", "produce.Basket"))
        .with_property(PropertyDescriptor::datetime("created").auto_now_add())
        .build()
}

pub fn basket_type() -> Arc<ModelType> {
    ModelType::new("produce", "Basket")
        .with_property(PropertyDescriptor::string("label"))
        .build()
}

pub fn registry() -> ModelRegistry {
    let namespace = Namespace::new("produce")
        .with_model(fruit_type())
        .with_model(basket_type());
    let mut registry = ModelRegistry::new();
    registry
        .register_from_namespace(&namespace, false, &[], false)
        .expect("models register");
    registry
}

pub fn test_config() -> HttpConfig {
    HttpConfig {
        enable_tracing: false,
        ..HttpConfig::default()
    }
}

pub fn test_state() -> ApiState {
    ApiState::new(registry(), MemoryDatastore::new_shared(), test_config())
}

pub fn test_app() -> Router {
    build_router(test_state())
}

/// Request addressed to `localhost`, with a JSON body when given
pub fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "localhost:8080");
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub json: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        text,
        json,
    }
}

/// Path and query of an absolute URL
pub fn path_and_query(url: &str) -> String {
    let parsed = url::Url::parse(url).unwrap();
    match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    }
}
