//! Property declarations - the schema of a model type
//!
//! `PropertyType` is a stable identifier for a kind of property. The
//! built-in identifiers cover the datastore's native types; applications may
//! introduce their own with [`PropertyType::new`] and register converters
//! for them.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDateTime;

use super::value::Value;
use crate::error::{ModelError, ModelResult};

/// Default maximum length of a `StringProperty`
pub const STRING_MAX_LENGTH: usize = 500;

/// Stable identifier of a property type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyType(Cow<'static, str>);

impl PropertyType {
    pub const STRING: Self = Self(Cow::Borrowed("StringProperty"));
    pub const TEXT: Self = Self(Cow::Borrowed("TextProperty"));
    pub const INTEGER: Self = Self(Cow::Borrowed("IntegerProperty"));
    pub const FLOAT: Self = Self(Cow::Borrowed("FloatProperty"));
    pub const BOOLEAN: Self = Self(Cow::Borrowed("BooleanProperty"));
    pub const DATE: Self = Self(Cow::Borrowed("DateProperty"));
    pub const DATETIME: Self = Self(Cow::Borrowed("DateTimeProperty"));
    pub const TIME: Self = Self(Cow::Borrowed("TimeProperty"));
    pub const GEO_PT: Self = Self(Cow::Borrowed("GeoPtProperty"));
    pub const REFERENCE: Self = Self(Cow::Borrowed("ReferenceProperty"));
    pub const LIST: Self = Self(Cow::Borrowed("ListProperty"));

    /// Declare a custom property type
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Types whose values are plain text
    pub fn is_string_like(&self) -> bool {
        *self == Self::STRING || *self == Self::TEXT
    }

    pub fn is_builtin(&self) -> bool {
        [
            Self::STRING,
            Self::TEXT,
            Self::INTEGER,
            Self::FLOAT,
            Self::BOOLEAN,
            Self::DATE,
            Self::DATETIME,
            Self::TIME,
            Self::GEO_PT,
            Self::REFERENCE,
            Self::LIST,
        ]
        .contains(self)
    }

    /// Name of the scalar type stored by this property type
    pub fn default_value_type(&self) -> String {
        let name = match self.as_str() {
            "StringProperty" => "str",
            "TextProperty" => "Text",
            "IntegerProperty" => "int",
            "FloatProperty" => "float",
            "BooleanProperty" => "bool",
            "DateProperty" => "date",
            "DateTimeProperty" => "datetime",
            "TimeProperty" => "time",
            "GeoPtProperty" => "GeoPt",
            "ReferenceProperty" => "Key",
            "ListProperty" => "list",
            other => other,
        };
        name.to_string()
    }

    /// Whether a non-null value may be stored in a property of this type.
    /// Custom types accept any value.
    pub fn accepts(&self, value: &Value) -> bool {
        match self.as_str() {
            "StringProperty" | "TextProperty" => matches!(value, Value::String(_)),
            "IntegerProperty" => matches!(value, Value::Integer(_)),
            "FloatProperty" => matches!(value, Value::Float(_)),
            "BooleanProperty" => matches!(value, Value::Bool(_)),
            "DateProperty" => matches!(value, Value::Date(_)),
            "DateTimeProperty" => matches!(value, Value::DateTime(_)),
            "TimeProperty" => matches!(value, Value::Time(_)),
            "GeoPtProperty" => matches!(value, Value::GeoPt(_)),
            "ReferenceProperty" => matches!(value, Value::Key(_)),
            "ListProperty" => matches!(value, Value::List(_)),
            _ => true,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declaration of a single property on a model type
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub property_type: PropertyType,
    /// Name of the scalar (or item) type held by the property
    pub value_type: String,
    pub required: bool,
    /// Element type for container properties
    pub item_type: Option<PropertyType>,
    pub choices: Option<Vec<Value>>,
    pub max_length: Option<usize>,
    pub multiline: Option<bool>,
    /// Qualified path of the model type a reference points to
    pub reference_kind: Option<String>,
    /// Refreshed with the current time on every put
    pub auto_now: bool,
    /// Set to the current time when the entity is created
    pub auto_now_add: bool,
    pub default: Option<Value>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            value_type: property_type.default_value_type(),
            property_type,
            required: false,
            item_type: None,
            choices: None,
            max_length: None,
            multiline: None,
            reference_kind: None,
            auto_now: false,
            auto_now_add: false,
            default: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::STRING)
            .max_length(STRING_MAX_LENGTH)
            .multiline(false)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::TEXT).multiline(true)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::INTEGER)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::FLOAT)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::BOOLEAN)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::DATE)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::DATETIME)
    }

    pub fn time(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::TIME)
    }

    pub fn geo_pt(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::GEO_PT)
    }

    /// Reference to an entity of the model type at `kind_path`
    pub fn reference(name: impl Into<String>, kind_path: impl Into<String>) -> Self {
        let mut descriptor = Self::new(name, PropertyType::REFERENCE);
        descriptor.reference_kind = Some(kind_path.into());
        descriptor
    }

    /// Container of `item_type` values
    pub fn list(name: impl Into<String>, item_type: PropertyType) -> Self {
        let mut descriptor = Self::new(name, PropertyType::LIST);
        descriptor.value_type = item_type.default_value_type();
        descriptor.item_type = Some(item_type);
        descriptor
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = Some(multiline);
        self
    }

    pub fn auto_now(mut self) -> Self {
        self.auto_now = true;
        self
    }

    pub fn auto_now_add(mut self) -> Self {
        self.auto_now_add = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The type each value is converted with: the item type for
    /// containers, the property type otherwise
    pub fn scalar_type(&self) -> &PropertyType {
        self.item_type.as_ref().unwrap_or(&self.property_type)
    }

    pub fn is_container(&self) -> bool {
        self.item_type.is_some()
    }

    /// Value used when an entity is constructed without this property
    pub fn initial_value(&self, now: NaiveDateTime) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }
        if self.auto_now || self.auto_now_add {
            if let Some(value) = self.timestamp_value(now) {
                return value;
            }
        }
        if self.is_container() {
            return Value::List(Vec::new());
        }
        Value::Null
    }

    /// `now` expressed in this property's date/time type
    pub fn timestamp_value(&self, now: NaiveDateTime) -> Option<Value> {
        match self.property_type.as_str() {
            "DateTimeProperty" => Some(Value::DateTime(now)),
            "DateProperty" => Some(Value::Date(now.date())),
            "TimeProperty" => Some(Value::Time(now.time())),
            _ => None,
        }
    }

    /// Check a value against this declaration
    pub fn validate(&self, value: &Value) -> ModelResult<()> {
        if value.is_null() {
            if self.required {
                return Err(ModelError::Validation(format!("Property {} is required", self.name)));
            }
            return Ok(());
        }

        if let Some(item_type) = &self.item_type {
            let Value::List(items) = value else {
                return Err(self.type_mismatch("list", value));
            };
            if self.required && items.is_empty() {
                return Err(ModelError::Validation(format!("Property {} is required", self.name)));
            }
            for item in items {
                if item.is_null() || !item_type.accepts(item) {
                    return Err(self.type_mismatch(&self.value_type, item));
                }
                self.validate_scalar(item)?;
            }
            return Ok(());
        }

        if !self.property_type.accepts(value) {
            return Err(self.type_mismatch(&self.value_type, value));
        }
        self.validate_scalar(value)
    }

    fn validate_scalar(&self, value: &Value) -> ModelResult<()> {
        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                return Err(ModelError::Validation(format!(
                    "Property {} is {}; must be one of {}",
                    self.name,
                    value,
                    choices.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                )));
            }
        }

        if let (Some(max_length), Value::String(s)) = (self.max_length, value) {
            if s.chars().count() > max_length {
                return Err(ModelError::Validation(format!(
                    "Property {} is {} characters long; it must be {} or less",
                    self.name,
                    s.chars().count(),
                    max_length
                )));
            }
        }

        if let (Some(kind), Value::Key(key)) = (&self.reference_kind, value) {
            if key.kind_path() != *kind {
                return Err(ModelError::Validation(format!(
                    "Property {} must reference a {}, got a {}",
                    self.name,
                    kind,
                    key.kind_path()
                )));
            }
        }

        Ok(())
    }

    fn type_mismatch(&self, expected: &str, value: &Value) -> ModelError {
        ModelError::Validation(format!(
            "Property {} must be a {}, got a {}",
            self.name,
            expected,
            value.type_name()
        ))
    }
}
