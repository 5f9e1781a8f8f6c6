//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// MongoDB connection URL. When None, documents are served from memory.
    pub mongodb_url: Option<String>,

    /// MongoDB database name (default: backoffice).
    pub mongodb_database: String,

    /// Seed file loaded into the in-memory store.
    pub seed_file: Option<PathBuf>,

    /// Language codes localized fields are matched under (default: "en").
    pub supported_languages: Vec<String>,

    /// Page size when a request omits it (default: 10).
    pub default_page_size: u64,

    /// Larger page sizes are capped to this (default: 100).
    pub max_page_size: u64,

    /// Request deadline in seconds (default: 30).
    pub request_timeout_secs: u64,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let mongodb_url = env::var("MONGODB_URL").ok().filter(|v| !v.is_empty());

        let mongodb_database =
            env::var("MONGODB_DATABASE").unwrap_or_else(|_| "backoffice".to_string());

        let seed_file = env::var("SEED_FILE").ok().map(PathBuf::from);

        let supported_languages = env::var("SUPPORTED_LANGUAGES")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| vec!["en".to_string()]);

        let default_page_size = env::var("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DEFAULT_PAGE_SIZE must be a valid u64")?;

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("MAX_PAGE_SIZE must be a valid u64")?;

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a valid u64")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            mongodb_url,
            mongodb_database,
            seed_file,
            supported_languages,
            default_page_size,
            max_page_size,
            request_timeout_secs,
            cors_allowed_origins,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            mongodb_url: None,
            mongodb_database: "backoffice".to_string(),
            seed_file: None,
            supported_languages: vec!["en".to_string()],
            default_page_size: 10,
            max_page_size: 100,
            request_timeout_secs: 30,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Split a comma-separated value, trimming entries and dropping empty ones.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
