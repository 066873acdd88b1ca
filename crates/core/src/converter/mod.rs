//! Property converter registry
//!
//! Maps property type identifiers to a pair of conversion functions: one
//! producing a JSON-safe representation of a native [`Value`], the other
//! parsing JSON back into a native value. Types without an entry use the
//! structural identity mapping of [`Value::to_json`]/[`Value::from_json`].
//! Container properties apply the item type's converter element-wise.

mod builtins;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonrest_orm::{ModelType, PropertyDescriptor, PropertyType, Value};
use serde_json::Value as JsonValue;
use thiserror::Error;

pub use builtins::{format_date, format_datetime, format_time, parse_date, parse_datetime, parse_time};

/// A single conversion failure; callers attach the property name
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Error for a value of an unexpected shape
    pub fn expected(expected: &str, got: &impl fmt::Display) -> Self {
        Self(format!("expected {}, got {}", expected, got))
    }
}

/// Looks up model types by namespace and name; used to resolve references
pub trait ModelResolver: Send + Sync {
    fn resolve_model(&self, namespace: &str, name: &str) -> Option<Arc<ModelType>>;
}

/// Resolver that knows no model types
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModels;

impl ModelResolver for NoModels {
    fn resolve_model(&self, _namespace: &str, _name: &str) -> Option<Arc<ModelType>> {
        None
    }
}

/// Native value to JSON
pub type SerializeFn = Arc<dyn Fn(&Value) -> Result<JsonValue, ConversionError> + Send + Sync>;

/// JSON to native value, with access to registered model types
pub type DeserializeFn =
    Arc<dyn Fn(&JsonValue, &dyn ModelResolver) -> Result<Value, ConversionError> + Send + Sync>;

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Native value to JSON
    Serialize,
    /// JSON to native value
    Deserialize,
}

/// A resolved conversion function
#[derive(Clone)]
pub enum Converter {
    Serialize(SerializeFn),
    Deserialize(DeserializeFn),
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Serialize(_) => f.write_str("Converter::Serialize"),
            Converter::Deserialize(_) => f.write_str("Converter::Deserialize"),
        }
    }
}

#[derive(Clone)]
struct ConverterPair {
    serialize: SerializeFn,
    deserialize: DeserializeFn,
}

/// Registry of per-property-type converters.
///
/// Built at startup and then shared read-only. Registering a type that
/// already has converters replaces them.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<PropertyType, ConverterPair>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.converters.keys().map(PropertyType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ConverterRegistry").field("types", &types).finish()
    }
}

impl ConverterRegistry {
    /// Registry with no converters; everything converts structurally
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with date, datetime, time, geographic point,
    /// float and reference converters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    /// Register the conversion pair for `property_type`, replacing any
    /// previous entry
    pub fn register<S, D>(&mut self, property_type: PropertyType, serialize: S, deserialize: D) -> &mut Self
    where
        S: Fn(&Value) -> Result<JsonValue, ConversionError> + Send + Sync + 'static,
        D: Fn(&JsonValue, &dyn ModelResolver) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.converters.insert(
            property_type,
            ConverterPair {
                serialize: Arc::new(serialize),
                deserialize: Arc::new(deserialize),
            },
        );
        self
    }

    pub fn contains(&self, property_type: &PropertyType) -> bool {
        self.converters.contains_key(property_type)
    }

    /// Resolve the converter for one direction; never fails
    pub fn resolve(&self, direction: Direction, property_type: &PropertyType) -> Converter {
        match direction {
            Direction::Serialize => Converter::Serialize(self.serializer(property_type)),
            Direction::Deserialize => Converter::Deserialize(self.deserializer(property_type)),
        }
    }

    pub fn serializer(&self, property_type: &PropertyType) -> SerializeFn {
        match self.converters.get(property_type) {
            Some(pair) => pair.serialize.clone(),
            None => Arc::new(|value: &Value| -> Result<JsonValue, ConversionError> { Ok(value.to_json()) }),
        }
    }

    pub fn deserializer(&self, property_type: &PropertyType) -> DeserializeFn {
        match self.converters.get(property_type) {
            Some(pair) => pair.deserialize.clone(),
            None => Arc::new(
                |json: &JsonValue, _: &dyn ModelResolver| -> Result<Value, ConversionError> { Ok(Value::from_json(json)) },
            ),
        }
    }

    /// Convert a stored property value to JSON.
    ///
    /// `Null` stays `null`; container values are converted element-wise
    /// with the item type's serializer.
    pub fn serialize_property(&self, property: &PropertyDescriptor, value: &Value) -> Result<JsonValue, ConversionError> {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }

        let serialize = self.serializer(property.scalar_type());
        if property.is_container() {
            let items = value
                .as_list()
                .ok_or_else(|| ConversionError::expected("a list", &value.type_name()))?;
            return items
                .iter()
                .map(|item| if item.is_null() { Ok(JsonValue::Null) } else { serialize(item) })
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array);
        }

        serialize(value)
    }

    /// Convert an inbound JSON value into a native property value.
    ///
    /// `null` becomes `Null`; container properties require a JSON array
    /// and convert each element with the item type's deserializer.
    pub fn deserialize_property(
        &self,
        property: &PropertyDescriptor,
        json: &JsonValue,
        resolver: &dyn ModelResolver,
    ) -> Result<Value, ConversionError> {
        if json.is_null() {
            return Ok(Value::Null);
        }

        if property.is_container() {
            let items = json
                .as_array()
                .ok_or_else(|| ConversionError::expected("a JSON array", &json))?;
            let deserialize = self.deserializer(property.scalar_type());
            return items
                .iter()
                .map(|item| if item.is_null() { Ok(Value::Null) } else { deserialize(item, resolver) })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List);
        }

        self.deserialize_scalar(property, json, resolver)
    }

    /// Convert a single JSON value with the property's scalar (item) type.
    ///
    /// Used for filter operands, which compare against list elements for
    /// container properties.
    pub fn deserialize_scalar(
        &self,
        property: &PropertyDescriptor,
        json: &JsonValue,
        resolver: &dyn ModelResolver,
    ) -> Result<Value, ConversionError> {
        if json.is_null() {
            return Ok(Value::Null);
        }
        (self.deserializer(property.scalar_type()))(json, resolver)
    }
}

/// Turn a raw query-string value into JSON for deserialization.
///
/// String-like properties keep the raw text. Other types parse it as a
/// JSON literal (`3`, `1.5`, `true`, `{"lat":1,"lon":2}`), falling back to
/// a JSON string so date and key converters see text.
pub fn coerce_query_value(property: &PropertyDescriptor, raw: &str) -> JsonValue {
    if property.scalar_type().is_string_like() {
        return JsonValue::String(raw.to_string());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use jsonrest_orm::{EntityKey, GeoPt};
    use serde_json::json;

    fn basket_resolver() -> impl ModelResolver {
        struct Baskets(Arc<ModelType>);
        impl ModelResolver for Baskets {
            fn resolve_model(&self, namespace: &str, name: &str) -> Option<Arc<ModelType>> {
                (self.0.namespace() == namespace && self.0.name() == name).then(|| self.0.clone())
            }
        }
        Baskets(ModelType::new("models", "Basket").build())
    }

    #[test]
    fn test_unknown_type_uses_identity() {
        let registry = ConverterRegistry::with_builtins();
        let custom = PropertyType::new("BlobProperty");

        let serialize = registry.serializer(&custom);
        assert_eq!(serialize(&Value::from("abc")).unwrap(), json!("abc"));

        let deserialize = registry.deserializer(&custom);
        assert_eq!(deserialize(&json!([1, "x"]), &NoModels).unwrap(), Value::List(vec![Value::Integer(1), Value::from("x")]));
        assert!(matches!(registry.resolve(Direction::Serialize, &custom), Converter::Serialize(_)));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = ConverterRegistry::with_builtins();
        registry.register(
            PropertyType::FLOAT,
            |_: &Value| Ok(json!("redacted")),
            |_: &JsonValue, _: &dyn ModelResolver| Ok(Value::Float(0.0)),
        );

        let serialize = registry.serializer(&PropertyType::FLOAT);
        assert_eq!(serialize(&Value::Float(2.5)).unwrap(), json!("redacted"));
        let deserialize = registry.deserializer(&PropertyType::FLOAT);
        assert_eq!(deserialize(&json!(9.0), &NoModels).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_list_properties_convert_element_wise() {
        let registry = ConverterRegistry::with_builtins();
        let touched = PropertyDescriptor::list("touched", PropertyType::DATE);

        let value = registry
            .deserialize_property(&touched, &json!(["2012-01-02", "2013-03-04T10:00:00"]), &NoModels)
            .unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Date(NaiveDate::from_ymd_opt(2012, 1, 2).unwrap()),
                Value::Date(NaiveDate::from_ymd_opt(2013, 3, 4).unwrap()),
            ])
        );
        assert_eq!(
            registry.serialize_property(&touched, &value).unwrap(),
            json!(["2012-01-02", "2013-03-04"])
        );

        let err = registry.deserialize_property(&touched, &json!("2012-01-02"), &NoModels);
        assert!(err.is_err());
    }

    #[test]
    fn test_null_passes_through() {
        let registry = ConverterRegistry::with_builtins();
        let location = PropertyDescriptor::geo_pt("location");

        assert_eq!(registry.serialize_property(&location, &Value::Null).unwrap(), JsonValue::Null);
        assert_eq!(
            registry.deserialize_property(&location, &JsonValue::Null, &NoModels).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_geo_pt_shapes() {
        let registry = ConverterRegistry::with_builtins();
        let location = PropertyDescriptor::geo_pt("location");

        let from_object = registry
            .deserialize_property(&location, &json!({"lat": 52.5, "lon": 13.4}), &NoModels)
            .unwrap();
        let from_pair = registry
            .deserialize_property(&location, &json!([52.5, 13.4]), &NoModels)
            .unwrap();
        assert_eq!(from_object, Value::GeoPt(GeoPt::new(52.5, 13.4)));
        assert_eq!(from_object, from_pair);
        assert_eq!(
            registry.serialize_property(&location, &from_object).unwrap(),
            json!({"lat": 52.5, "lon": 13.4})
        );

        assert!(registry.deserialize_property(&location, &json!("52.5,13.4"), &NoModels).is_err());
        assert!(registry.deserialize_property(&location, &json!([52.5]), &NoModels).is_err());
        assert!(registry.deserialize_property(&location, &json!({"lat": 91.0, "lon": 0.0}), &NoModels).is_err());
    }

    #[test]
    fn test_reference_conversion() {
        let registry = ConverterRegistry::with_builtins();
        let resolver = basket_resolver();
        let basket = PropertyDescriptor::reference("basket", "models.Basket");
        let key = EntityKey::new("models", "Basket", 7);

        let json = registry.serialize_property(&basket, &Value::Key(key.clone())).unwrap();
        assert_eq!(
            json,
            json!({"type_name": "Basket", "type_namespace": "models", "id": 7, "key": key.encode()})
        );

        for input in [json.clone(), json!(key.encode()), json!({"key": key.encode()})] {
            assert_eq!(
                registry.deserialize_property(&basket, &input, &resolver).unwrap(),
                Value::Key(key.clone())
            );
        }

        let unknown = json!({"type_namespace": "models", "type_name": "Crate", "id": 7});
        assert!(registry.deserialize_property(&basket, &unknown, &resolver).is_err());
        assert!(registry.deserialize_property(&basket, &json!(12), &resolver).is_err());
    }

    #[test]
    fn test_float_accepts_numeric_strings() {
        let registry = ConverterRegistry::with_builtins();
        let width = PropertyDescriptor::float("width");

        assert_eq!(registry.deserialize_property(&width, &json!(3), &NoModels).unwrap(), Value::Float(3.0));
        assert_eq!(registry.deserialize_property(&width, &json!("2.5"), &NoModels).unwrap(), Value::Float(2.5));
        assert!(registry.deserialize_property(&width, &json!("wide"), &NoModels).is_err());
    }

    #[test]
    fn test_coerce_query_value() {
        let name = PropertyDescriptor::string("name");
        let width = PropertyDescriptor::integer("width");
        let created = PropertyDescriptor::date("created");
        let tags = PropertyDescriptor::list("tags", PropertyType::STRING);

        assert_eq!(coerce_query_value(&name, "42"), json!("42"));
        assert_eq!(coerce_query_value(&width, "42"), json!(42));
        assert_eq!(coerce_query_value(&created, "2012-01-01"), json!("2012-01-01"));
        assert_eq!(coerce_query_value(&tags, "true"), json!("true"));
    }
}
