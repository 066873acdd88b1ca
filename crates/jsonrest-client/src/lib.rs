//! # jsonrest-client
//!
//! Minimal client for jsonrest APIs. A [`JsonClient`] is bound to one
//! model and offers create/read/update/delete plus a [`Query`] builder for
//! cursor-paged search.

pub mod client;
pub mod error;
pub mod query;

pub use client::JsonClient;
pub use error::{ClientError, ClientResult};
pub use query::{Query, SearchPage};
