//! Query Builder - datastore queries
//!
//! - `types`: operators, filters, ordering
//! - `builder`: the `Query` builder
//! - `cursor`: opaque continuation cursors

pub mod builder;
pub mod cursor;
pub mod types;

pub use builder::Query;
pub use cursor::Cursor;
pub use types::{Filter, Order, OrderDirection, QueryOperator};
