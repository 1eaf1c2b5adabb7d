use super::RequestsLoggingLevel;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// Upper bound for request bodies, enforced before JSON decoding.
    pub max_body_bytes: usize,
    /// Maximum number of hits requested from the external catalog per search.
    pub search_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8080,
            frontend_dir_path: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}
