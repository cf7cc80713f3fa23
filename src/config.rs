//! Runtime configuration, read once at startup.

use crate::conversation::Variant;
use reqwest::Url;
use std::path::PathBuf;

const DEFAULT_PAGE_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid page URL {url}: {reason}")]
    PageUrl { url: String, reason: String },
    #[error("Unknown variant: {0} (expected `classic` or `assisted`)")]
    Variant(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit backend base URL; wins over host-based resolution.
    pub api_url: Option<String>,
    /// Where the client is served from. Supplies the host name for endpoint
    /// resolution and the origin for same-origin requests.
    pub page_url: Url,
    pub variant: Variant,
    /// Directory holding the feedback database.
    pub data_dir: PathBuf,
    /// Terminal width in columns, when the shell exports it.
    pub columns: Option<u32>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("YASEEN_API_URL")
            .or_else(|| lookup("VITE_API_URL"))
            .filter(|url| !url.is_empty());

        let raw_page = lookup("YASEEN_PAGE_URL").unwrap_or_else(|| DEFAULT_PAGE_URL.to_string());
        let page_url = Url::parse(&raw_page).map_err(|e| ConfigError::PageUrl {
            url: raw_page.clone(),
            reason: e.to_string(),
        })?;
        if page_url.host_str().is_none() {
            return Err(ConfigError::PageUrl {
                url: raw_page,
                reason: "missing host".to_string(),
            });
        }

        let variant = match lookup("YASEEN_VARIANT") {
            Some(raw) => Variant::parse(&raw).ok_or(ConfigError::Variant(raw))?,
            None => Variant::default(),
        };

        let data_dir = lookup("YASEEN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| match lookup("HOME") {
                Some(home) => PathBuf::from(home).join(".yaseen"),
                None => PathBuf::from(".yaseen"),
            });

        let columns = lookup("COLUMNS").and_then(|raw| raw.trim().parse().ok());

        Ok(Self {
            api_url,
            page_url,
            variant,
            data_dir,
            columns,
        })
    }

    pub fn host(&self) -> &str {
        self.page_url.host_str().unwrap_or_default()
    }
}
