//! Default configuration values

pub struct HttpDefaults;

impl HttpDefaults {
    pub const PREFIX: &'static str = "rest";
    pub const HOST: &'static str = "127.0.0.1";
    pub const PORT: u16 = 8080;
    pub const REQUIRE_HTTPS: bool = false;
    pub const DEFAULT_LIMIT: usize = jsonrest_core::search::DEFAULT_LIMIT;
    pub const MAX_LIMIT: usize = jsonrest_core::search::MAX_LIMIT;
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const MAX_REQUEST_SIZE: usize = 2 * 1024 * 1024;
    pub const ENABLE_TRACING: bool = true;
    pub const DEBUG: bool = false;
}
