//! # jsonrest-orm: Datastore layer for jsonrest
//!
//! Runtime model types, property schemas, entity values, queries with
//! cursor continuation, and the [`Datastore`] capability consumed by the
//! REST layer. [`MemoryDatastore`] is the bundled in-process backend.

pub mod datastore;
pub mod error;
pub mod model;
pub mod query;

#[cfg(test)]
mod tests;

pub use datastore::*;
pub use error::*;
pub use model::*;
pub use query::*;
