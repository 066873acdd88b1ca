//! Tests for jsonrest-orm
//!
//! Cover entity construction and validation, and the in-memory datastore:
//! CRUD, filters, ordering and cursor paging.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::datastore::{Datastore, MemoryDatastore};
use crate::error::ModelError;
use crate::model::{Entity, GeoPt, ModelType, PropertyDescriptor, PropertyType, Value};
use crate::query::{OrderDirection, Query, QueryOperator};

fn fruit_type() -> Arc<ModelType> {
    ModelType::new("tests", "Fruit")
        .with_property(PropertyDescriptor::string("name").required())
        .with_property(PropertyDescriptor::integer("width"))
        .with_property(PropertyDescriptor::geo_pt("location"))
        .with_property(PropertyDescriptor::list("tags", PropertyType::STRING))
        .with_property(PropertyDescriptor::datetime("created").auto_now_add())
        .with_property(PropertyDescriptor::datetime("modified").auto_now())
        .build()
}

fn fruit(model: &Arc<ModelType>, name: &str, width: i64) -> Entity {
    let mut values = BTreeMap::new();
    values.insert("name".to_string(), Value::from(name));
    values.insert("width".to_string(), Value::from(width));
    model.instantiate(values).expect("valid fruit")
}

async fn seed(store: &MemoryDatastore, model: &Arc<ModelType>, rows: &[(&str, i64)]) -> Vec<i64> {
    let mut ids = Vec::new();
    for (name, width) in rows {
        let mut entity = fruit(model, name, *width);
        ids.push(store.put(&mut entity).await.expect("put").id());
    }
    ids
}

#[test]
fn test_instantiate_fills_defaults_and_timestamps() {
    let model = fruit_type();
    let entity = fruit(&model, "Apple", 3);

    assert!(!entity.is_saved());
    assert_eq!(entity.get("name"), &Value::from("Apple"));
    assert_eq!(entity.get("location"), &Value::Null);
    assert_eq!(entity.get("tags"), &Value::List(Vec::new()));
    assert!(matches!(entity.get("created"), Value::DateTime(_)));
    assert!(matches!(entity.get("modified"), Value::DateTime(_)));
}

#[test]
fn test_instantiate_rejects_unknown_and_missing_required() {
    let model = fruit_type();

    let mut unknown = BTreeMap::new();
    unknown.insert("name".to_string(), Value::from("Apple"));
    unknown.insert("colour".to_string(), Value::from("red"));
    assert!(matches!(model.instantiate(unknown), Err(ModelError::Validation(_))));

    let missing = BTreeMap::new();
    assert!(matches!(model.instantiate(missing), Err(ModelError::Validation(_))));
}

#[test]
fn test_entity_set_validates_type() {
    let model = fruit_type();
    let mut entity = fruit(&model, "Apple", 3);

    assert!(entity.set("width", Value::from(7i64)).is_ok());
    assert_eq!(entity.get("width"), &Value::Integer(7));

    let err = entity.set("width", Value::from("wide")).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    assert!(entity.set("location", Value::GeoPt(GeoPt::new(52.37, 4.89))).is_ok());
}

#[tokio::test]
async fn test_put_assigns_ids_and_get_round_trips() {
    let model = fruit_type();
    let store = MemoryDatastore::new();

    let mut apple = fruit(&model, "Apple", 3);
    let key = store.put(&mut apple).await.unwrap();
    assert!(apple.is_saved());
    assert_eq!(key.kind(), "Fruit");

    let loaded = store.get_by_id(&model, key.id()).await.unwrap().unwrap();
    assert_eq!(loaded.get("name"), &Value::from("Apple"));

    let by_key = store.get_by_key(&model, &key.encode()).await.unwrap();
    assert_eq!(by_key.id(), Some(key.id()));

    assert!(store.get_by_id(&model, key.id() + 100).await.unwrap().is_none());
    assert_eq!(store.count(&model), 1);
}

#[tokio::test]
async fn test_put_existing_entity_replaces_it() {
    let model = fruit_type();
    let store = MemoryDatastore::new();

    let mut apple = fruit(&model, "Apple", 3);
    let key = store.put(&mut apple).await.unwrap();

    apple.set("width", Value::from(9i64)).unwrap();
    let again = store.put(&mut apple).await.unwrap();

    assert_eq!(key, again);
    assert_eq!(store.count(&model), 1);
    let loaded = store.get_by_id(&model, key.id()).await.unwrap().unwrap();
    assert_eq!(loaded.get("width"), &Value::Integer(9));
}

#[tokio::test]
async fn test_get_by_key_rejects_foreign_and_malformed_keys() {
    let model = fruit_type();
    let basket = ModelType::new("tests", "Basket").build();
    let store = MemoryDatastore::new();

    let mut apple = fruit(&model, "Apple", 3);
    let key = store.put(&mut apple).await.unwrap();

    assert!(matches!(
        store.get_by_key(&basket, &key.encode()).await,
        Err(ModelError::InvalidKey(_))
    ));
    assert!(matches!(
        store.get_by_key(&model, "not-a-key").await,
        Err(ModelError::InvalidKey(_))
    ));

    let missing = model.key_for(key.id() + 1).encode();
    assert!(matches!(
        store.get_by_key(&model, &missing).await,
        Err(ModelError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_removes_entity() {
    let model = fruit_type();
    let store = MemoryDatastore::new();

    let mut apple = fruit(&model, "Apple", 3);
    let key = store.put(&mut apple).await.unwrap();

    store.delete(&key).await.unwrap();
    assert!(store.get_by_id(&model, key.id()).await.unwrap().is_none());
    assert!(matches!(store.delete(&key).await, Err(ModelError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_filters_conjunctively() {
    let model = fruit_type();
    let store = MemoryDatastore::new();
    seed(&store, &model, &[("Banana", 2), ("Banana", 5), ("Apple", 5), ("Cherry", 1)]).await;

    let query = Query::new(model.clone())
        .filter_eq("name", "Banana")
        .filter("width", QueryOperator::GreaterThan, 3i64);
    let results = store.fetch(&query).await.unwrap();

    assert_eq!(results.rows.len(), 1);
    assert_eq!(results.rows[0].get("width"), &Value::Integer(5));

    let query = Query::new(model.clone()).filter("name", QueryOperator::NotEqual, "Banana");
    assert_eq!(store.fetch(&query).await.unwrap().rows.len(), 2);
}

#[tokio::test]
async fn test_fetch_list_filter_matches_any_element() {
    let model = fruit_type();
    let store = MemoryDatastore::new();

    let mut values = BTreeMap::new();
    values.insert("name".to_string(), Value::from("Apple"));
    values.insert(
        "tags".to_string(),
        Value::List(vec![Value::from("red"), Value::from("sweet")]),
    );
    let mut apple = model.instantiate(values).unwrap();
    store.put(&mut apple).await.unwrap();
    seed(&store, &model, &[("Lemon", 2)]).await;

    let query = Query::new(model.clone()).filter_eq("tags", "sweet");
    let results = store.fetch(&query).await.unwrap();
    assert_eq!(results.rows.len(), 1);
    assert_eq!(results.rows[0].get("name"), &Value::from("Apple"));
}

#[tokio::test]
async fn test_fetch_orders_rows() {
    let model = fruit_type();
    let store = MemoryDatastore::new();
    seed(&store, &model, &[("Banana", 2), ("Apple", 5), ("Cherry", 1)]).await;

    let names = |rows: &[Entity]| {
        rows.iter()
            .map(|row| row.get("name").as_str().unwrap_or_default().to_string())
            .collect::<Vec<_>>()
    };

    let asc = store
        .fetch(&Query::new(model.clone()).order("name", OrderDirection::Asc))
        .await
        .unwrap();
    assert_eq!(names(&asc.rows), vec!["Apple", "Banana", "Cherry"]);

    let desc = store.fetch(&Query::new(model.clone()).order_by("-width")).await.unwrap();
    assert_eq!(names(&desc.rows), vec!["Apple", "Banana", "Cherry"]);
}

#[tokio::test]
async fn test_cursor_pages_are_disjoint_and_complete() {
    let model = fruit_type();
    let store = MemoryDatastore::new();
    let ids = seed(
        &store,
        &model,
        &[("Banana", 4), ("Banana", 2), ("Apple", 1), ("Banana", 2), ("Banana", 9)],
    )
    .await;

    let base = Query::new(model.clone()).filter_eq("name", "Banana").order_by("width");
    let mut seen = Vec::new();
    let mut cursor = None;

    loop {
        let mut query = base.clone().limit(2);
        if let Some(cursor) = cursor.take() {
            query = query.with_cursor(cursor);
        }
        let page = store.fetch(&query).await.unwrap();
        if page.rows.is_empty() {
            break;
        }
        seen.extend(page.rows.iter().filter_map(Entity::id));
        cursor = page.cursor;
    }

    assert_eq!(seen, vec![ids[1], ids[3], ids[0], ids[4]]);
}

#[tokio::test]
async fn test_fetch_past_end_keeps_cursor() {
    let model = fruit_type();
    let store = MemoryDatastore::new();
    seed(&store, &model, &[("Banana", 1)]).await;

    let first = store.fetch(&Query::new(model.clone()).limit(1)).await.unwrap();
    let cursor = first.cursor.clone().unwrap();

    let second = store
        .fetch(&Query::new(model.clone()).limit(1).with_cursor(cursor.clone()))
        .await
        .unwrap();
    assert!(second.rows.is_empty());
    assert_eq!(second.cursor, Some(cursor));
}

#[tokio::test]
async fn test_fetch_rejects_garbage_cursor() {
    let model = fruit_type();
    let store = MemoryDatastore::new();

    let query = Query::new(model.clone()).with_cursor("zz-not-hex".into());
    assert!(matches!(store.fetch(&query).await, Err(ModelError::InvalidCursor(_))));

    // hex, but not a position this store wrote
    let query = Query::new(model).with_cursor("00".into());
    assert!(matches!(store.fetch(&query).await, Err(ModelError::InvalidCursor(_))));
}
