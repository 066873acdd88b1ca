pub mod lifecycle;

pub use lifecycle::{serve_listener, shutdown_signal, start_server};
