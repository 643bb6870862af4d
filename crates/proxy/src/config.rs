//! Configuration for the proxy service.

use std::env;

/// Proxy service configuration.
///
/// The integration token is required and checked at startup; the parent page
/// id is only needed by database creation and is checked lazily at call time.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Notion integration token for API calls.
    pub api_token: Option<String>,
    /// Parent page under which new databases are created.
    pub parent_page_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("PROXY_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            api_token: env::var("NOTION_API_TOKEN").ok().filter(|s| !s.is_empty()),
            parent_page_id: env::var("NOTION_PAGE_ID").ok().filter(|s| !s.is_empty()),
        }
    }
}
