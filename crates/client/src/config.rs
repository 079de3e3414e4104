/// Default API root for a locally running server.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root every request path is appended to, without a trailing `/`.
    pub api_base_url: String,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// | Env Var        | Default                     |
    /// |----------------|-----------------------------|
    /// | `API_BASE_URL` | `http://localhost:3000/api` |
    pub fn from_env() -> Self {
        Self::new(std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
