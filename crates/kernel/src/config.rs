//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default upload ceiling for the media endpoint (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Public site URL used for `link` and `source_url` fields.
    pub site_url: String,

    /// Username accepted by HTTP Basic authentication (default: admin).
    pub api_user: String,

    /// Password accepted by HTTP Basic authentication. When empty, every
    /// authenticated endpoint answers 401.
    pub api_password: String,

    /// Post types registered by the kernel at startup
    /// (comma-separated, default: "documentation,tutorials").
    pub post_types: Vec<String>,

    /// Plugins to activate at startup. `None` activates every registered plugin.
    pub activate_plugins: Option<Vec<String>>,

    /// JSON file holding active plugins and the flushed rewrite rules.
    pub state_file: Option<PathBuf>,

    /// Maximum accepted media upload size in bytes.
    pub max_upload_bytes: usize,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            site_url: "http://localhost:3000".to_string(),
            api_user: "admin".to_string(),
            api_password: String::new(),
            post_types: vec!["documentation".to_string(), "tutorials".to_string()],
            activate_plugins: None,
            state_file: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let site_url = env::var("SITE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let api_user = env::var("API_USER").unwrap_or_else(|_| "admin".to_string());
        let api_password = env::var("API_PASSWORD").unwrap_or_default();

        let post_types = env::var("POST_TYPES")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| vec!["documentation".to_string(), "tutorials".to_string()]);

        let activate_plugins = env::var("ACTIVATE_PLUGINS").ok().map(|v| split_list(&v));

        let state_file = env::var("STATE_FILE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(v) => v
                .parse()
                .context("MAX_UPLOAD_BYTES must be a valid byte count")?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            site_url,
            api_user,
            api_password,
            post_types,
            activate_plugins,
            state_file,
            max_upload_bytes,
            cors_allowed_origins,
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
