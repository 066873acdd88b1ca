pub mod envelope;

pub use envelope::{render_json, wants_pretty, JsonEnvelope};
