//! Model System - runtime schema and instances
//!
//! - `property`: property type identifiers and declarations
//! - `model_type`: model types (kinds) and instantiation
//! - `entity`: model instances
//! - `key`: persistent entity identity
//! - `value`: native property values

pub mod entity;
pub mod key;
pub mod model_type;
pub mod property;
pub mod value;

pub use entity::Entity;
pub use key::{qualified_path, EntityKey};
pub use model_type::ModelType;
pub use property::{PropertyDescriptor, PropertyType, STRING_MAX_LENGTH};
pub use value::{GeoPt, Value};
