//! Demo models: fruit sitting in baskets

use std::sync::Arc;

use jsonrest_core::Namespace;
use jsonrest_orm::{ModelType, PropertyDescriptor, PropertyType};

pub const NAMESPACE: &str = "produce";

pub fn basket() -> Arc<ModelType> {
    ModelType::new(NAMESPACE, "Basket")
        .with_property(PropertyDescriptor::string("label").required())
        .with_property(PropertyDescriptor::geo_pt("location"))
        .with_property(PropertyDescriptor::datetime("created").auto_now_add())
        .build()
}

pub fn fruit() -> Arc<ModelType> {
    ModelType::new(NAMESPACE, "Fruit")
        .with_property(PropertyDescriptor::string("name").required())
        .with_property(PropertyDescriptor::integer("width"))
        .with_property(
            PropertyDescriptor::string("colour").choices(["red", "green", "yellow", "purple"]),
        )
        .with_property(PropertyDescriptor::text("notes").multiline(true))
        .with_property(PropertyDescriptor::float("weight"))
        .with_property(PropertyDescriptor::boolean("ripe"))
        .with_property(PropertyDescriptor::date("picked"))
        .with_property(PropertyDescriptor::time("picked_at"))
        .with_property(PropertyDescriptor::geo_pt("location"))
        .with_property(PropertyDescriptor::list("tags", PropertyType::STRING))
        .with_property(PropertyDescriptor::reference("basket", format!("{}.Basket", NAMESPACE)))
        .with_property(PropertyDescriptor::datetime("created").auto_now_add())
        .with_property(PropertyDescriptor::datetime("modified").auto_now())
        .build()
}

/// Namespace graph scanned at startup
pub fn produce() -> Namespace {
    Namespace::new(NAMESPACE).with_model(basket()).with_model(fruit())
}
