//! Model converter - entity ⇄ JSON object, plus schema metadata
//!
//! [`ModelConverter`] is pluggable per registered model; the default
//! [`DictionaryConverter`] maps every declared property through the
//! [`ConverterRegistry`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonrest_orm::{Datastore, Entity, ModelType, PropertyDescriptor};
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use crate::converter::{ConverterRegistry, ModelResolver};
use crate::errors::{ApiError, ApiResult};

/// JSON object form of an entity or request body
pub type JsonMap = Map<String, JsonValue>;

/// Everything a conversion needs besides the data itself
#[derive(Clone, Copy)]
pub struct ConversionContext<'a> {
    pub converters: &'a ConverterRegistry,
    pub resolver: &'a dyn ModelResolver,
}

impl<'a> ConversionContext<'a> {
    pub fn new(converters: &'a ConverterRegistry, resolver: &'a dyn ModelResolver) -> Self {
        Self { converters, resolver }
    }

    /// Convert one inbound property value, naming the property on failure
    pub fn deserialize(&self, property: &PropertyDescriptor, json: &JsonValue) -> ApiResult<jsonrest_orm::Value> {
        self.converters
            .deserialize_property(property, json, self.resolver)
            .map_err(|e| ApiError::type_conversion(&property.name, e.0))
    }

    /// Convert a stored property value, naming the property on failure
    pub fn serialize(&self, property: &PropertyDescriptor, value: &jsonrest_orm::Value) -> ApiResult<JsonValue> {
        self.converters
            .serialize_property(property, value)
            .map_err(|e| ApiError::unhandled_property(&property.name, e.0))
    }
}

/// Converts between entities of one model type and JSON objects
#[async_trait]
pub trait ModelConverter: Send + Sync {
    /// JSON form of an entity: `key`, `id` and every declared property
    fn read(&self, ctx: &ConversionContext<'_>, entity: &Entity) -> ApiResult<JsonMap>;

    /// Build, validate and persist a new entity from a JSON object.
    /// Keys naming no declared property are ignored.
    async fn create(
        &self,
        ctx: &ConversionContext<'_>,
        store: &dyn Datastore,
        model: &Arc<ModelType>,
        values: &JsonMap,
    ) -> ApiResult<Entity>;

    /// Assign the given properties of an existing entity and persist it
    async fn update(
        &self,
        ctx: &ConversionContext<'_>,
        store: &dyn Datastore,
        entity: Entity,
        values: &JsonMap,
    ) -> ApiResult<Entity>;

    /// Schema descriptor keyed by property name
    fn metadata(&self, model: &ModelType) -> JsonMap;
}

/// Default converter: one JSON member per declared property
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryConverter;

impl DictionaryConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> Arc<dyn ModelConverter> {
        Arc::new(Self)
    }

    fn convert_values(
        ctx: &ConversionContext<'_>,
        model: &ModelType,
        values: &JsonMap,
    ) -> ApiResult<BTreeMap<String, jsonrest_orm::Value>> {
        let mut converted = BTreeMap::new();
        for (name, json) in values {
            match model.property(name) {
                Some(property) => {
                    converted.insert(name.clone(), ctx.deserialize(property, json)?);
                }
                None => debug!(model = %model.name(), property = %name, "Ignoring undeclared property"),
            }
        }
        Ok(converted)
    }
}

#[async_trait]
impl ModelConverter for DictionaryConverter {
    fn read(&self, ctx: &ConversionContext<'_>, entity: &Entity) -> ApiResult<JsonMap> {
        let mut result = JsonMap::new();
        result.insert("key".to_string(), json!(entity.key().map(|key| key.encode())));
        result.insert("id".to_string(), json!(entity.id()));

        for property in entity.model().properties() {
            let value = ctx.serialize(property, entity.get(&property.name))?;
            result.insert(property.name.clone(), value);
        }
        Ok(result)
    }

    async fn create(
        &self,
        ctx: &ConversionContext<'_>,
        store: &dyn Datastore,
        model: &Arc<ModelType>,
        values: &JsonMap,
    ) -> ApiResult<Entity> {
        let converted = Self::convert_values(ctx, model, values)?;
        let mut entity = model.instantiate(converted)?;
        store.put(&mut entity).await?;
        Ok(entity)
    }

    async fn update(
        &self,
        ctx: &ConversionContext<'_>,
        store: &dyn Datastore,
        mut entity: Entity,
        values: &JsonMap,
    ) -> ApiResult<Entity> {
        let converted = Self::convert_values(ctx, entity.model(), values)?;
        for (name, value) in converted {
            entity.set(&name, value)?;
        }
        store.put(&mut entity).await?;
        Ok(entity)
    }

    fn metadata(&self, model: &ModelType) -> JsonMap {
        model
            .properties()
            .iter()
            .map(|property| (property.name.clone(), JsonValue::Object(property_metadata(property))))
            .collect()
    }
}

fn property_metadata(property: &PropertyDescriptor) -> JsonMap {
    let mut data = JsonMap::new();
    data.insert("required".to_string(), json!(property.required));
    data.insert("property_class".to_string(), json!(property.property_type.as_str()));
    data.insert("value_type".to_string(), json!(property.value_type));

    if let Some(choices) = property.choices.as_ref().filter(|choices| !choices.is_empty()) {
        let choices: Vec<JsonValue> = choices.iter().map(jsonrest_orm::Value::to_json).collect();
        data.insert("choices".to_string(), JsonValue::Array(choices));
    }
    if let Some(multiline) = property.multiline {
        data.insert("multiline".to_string(), json!(multiline));
    }
    if let Some(max_length) = property.max_length {
        data.insert("max_length".to_string(), json!(max_length));
    }
    if let Some(item_type) = &property.item_type {
        data.insert("item_type".to_string(), json!(item_type.as_str()));
    }
    if let Some(reference_kind) = &property.reference_kind {
        data.insert("reference_class".to_string(), json!(reference_kind));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::NoModels;
    use jsonrest_orm::{MemoryDatastore, PropertyType, Value};

    fn fruit_type() -> Arc<ModelType> {
        ModelType::new("models", "Fruit")
            .with_property(PropertyDescriptor::string("name").required())
            .with_property(PropertyDescriptor::float("width"))
            .with_property(PropertyDescriptor::geo_pt("location"))
            .with_property(PropertyDescriptor::list("touched", PropertyType::DATETIME))
            .with_property(PropertyDescriptor::string("colour").choices(["red", "green"]))
            .build()
    }

    fn body(json: JsonValue) -> JsonMap {
        match json {
            JsonValue::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let converters = ConverterRegistry::with_builtins();
        let ctx = ConversionContext::new(&converters, &NoModels);
        let store = MemoryDatastore::new();
        let model = fruit_type();

        let values = body(json!({
            "name": "Banana",
            "width": "2.5",
            "location": [1.0, 2.0],
            "touched": ["2012-01-01T10:00:00"],
            "unknown": "ignored",
        }));
        let entity = DictionaryConverter.create(&ctx, &store, &model, &values).await.unwrap();
        assert!(entity.is_saved());

        let read = DictionaryConverter.read(&ctx, &entity).unwrap();
        assert_eq!(read["id"], json!(entity.id()));
        assert_eq!(read["key"], json!(entity.key().unwrap().encode()));
        assert_eq!(read["name"], json!("Banana"));
        assert_eq!(read["width"], json!(2.5));
        assert_eq!(read["location"], json!({"lat": 1.0, "lon": 2.0}));
        assert_eq!(read["touched"], json!(["2012-01-01T10:00:00"]));
        assert_eq!(read["colour"], JsonValue::Null);
        assert!(!read.contains_key("unknown"));
    }

    #[tokio::test]
    async fn test_create_reports_conversion_and_validation_failures() {
        let converters = ConverterRegistry::with_builtins();
        let ctx = ConversionContext::new(&converters, &NoModels);
        let store = MemoryDatastore::new();
        let model = fruit_type();

        let bad_width = body(json!({"name": "Banana", "width": "wide"}));
        let err = DictionaryConverter.create(&ctx, &store, &model, &bad_width).await.unwrap_err();
        assert!(matches!(err, ApiError::TypeConversion { ref property, .. } if property == "width"));

        let missing_name = body(json!({"width": 1.0}));
        let err = DictionaryConverter.create(&ctx, &store, &model, &missing_name).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        let bad_choice = body(json!({"name": "Banana", "colour": "blue"}));
        let err = DictionaryConverter.create(&ctx, &store, &model, &bad_choice).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert_eq!(store.count(&model), 0);
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let converters = ConverterRegistry::with_builtins();
        let ctx = ConversionContext::new(&converters, &NoModels);
        let store = MemoryDatastore::new();
        let model = fruit_type();

        let entity = DictionaryConverter
            .create(&ctx, &store, &model, &body(json!({"name": "Banana"})))
            .await
            .unwrap();
        let id = entity.id();

        let change = body(json!({"width": 4}));
        let once = DictionaryConverter.update(&ctx, &store, entity, &change).await.unwrap();
        let twice = DictionaryConverter.update(&ctx, &store, once.clone(), &change).await.unwrap();

        assert_eq!(once.id(), id);
        assert_eq!(twice.id(), id);
        assert_eq!(twice.get("width"), &Value::Float(4.0));
        assert_eq!(twice.get("name"), &Value::from("Banana"));
        assert_eq!(store.count(&model), 1);
    }

    #[test]
    fn test_read_reports_unhandled_property() {
        let converters = ConverterRegistry::with_builtins();
        let ctx = ConversionContext::new(&converters, &NoModels);
        let model = fruit_type();

        let mut values = BTreeMap::new();
        values.insert("name".to_string(), Value::from("Banana"));
        values.insert("location".to_string(), Value::from("somewhere"));
        let entity = Entity::from_parts(model, None, values);

        let err = DictionaryConverter.read(&ctx, &entity).unwrap_err();
        assert!(matches!(err, ApiError::UnhandledProperty { ref property, .. } if property == "location"));
    }

    #[test]
    fn test_metadata() {
        let model = ModelType::new("models", "Fruit")
            .with_property(PropertyDescriptor::string("name").required())
            .with_property(PropertyDescriptor::text("notes"))
            .with_property(PropertyDescriptor::list("touched", PropertyType::DATETIME))
            .with_property(PropertyDescriptor::reference("basket", "models.Basket"))
            .with_property(PropertyDescriptor::string("colour").choices(["red", "green"]))
            .build();

        let metadata = DictionaryConverter.metadata(&model);

        assert_eq!(
            metadata["name"],
            json!({
                "required": true,
                "property_class": "StringProperty",
                "value_type": "str",
                "multiline": false,
                "max_length": 500,
            })
        );
        assert_eq!(metadata["notes"]["multiline"], json!(true));
        assert_eq!(metadata["touched"]["item_type"], json!("DateTimeProperty"));
        assert_eq!(metadata["touched"]["value_type"], json!("datetime"));
        assert_eq!(metadata["basket"]["reference_class"], json!("models.Basket"));
        assert_eq!(metadata["basket"]["value_type"], json!("Key"));
        assert_eq!(metadata["colour"]["choices"], json!(["red", "green"]));
    }
}
