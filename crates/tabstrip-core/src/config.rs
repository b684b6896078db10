//! Tab strip configuration

use crate::error::{TabStripError, TabStripResult};
use crate::logging::{LogConfig, LogFormat};
use crate::types::InsertionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;
use url::Url;

/// URL that identifies a freshly opened, untouched tab
pub const DEFAULT_NEW_TAB_URL: &str = "about:newtab";

/// Tab strip configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabStripConfig {
    /// Where link-opened tabs are placed relative to their opener
    pub insertion_policy: InsertionPolicy,

    /// URL of the new tab page
    pub new_tab_url: Url,

    /// Logging settings for tools embedding the model
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// One of trace, debug, info, warn, error
    pub level: String,

    pub format: LogFormat,

    /// Optional `EnvFilter` directive overriding `level`
    pub filter: Option<String>,
}

impl Default for TabStripConfig {
    fn default() -> Self {
        Self {
            insertion_policy: InsertionPolicy::default(),
            new_tab_url: default_new_tab_url(),
            logging: LogSettings::default(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            filter: None,
        }
    }
}

fn default_new_tab_url() -> Url {
    match Url::parse(DEFAULT_NEW_TAB_URL) {
        Ok(url) => url,
        Err(_) => unreachable!("DEFAULT_NEW_TAB_URL is a valid URL"),
    }
}

impl TabStripConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> TabStripResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> TabStripResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("Loaded tab strip config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> TabStripResult<()> {
        self.logging.level()?;
        if self.new_tab_url.cannot_be_a_base() && self.new_tab_url.scheme() != "about" {
            return Err(TabStripError::config(format!(
                "new_tab_url {} is not a navigable page",
                self.new_tab_url
            )));
        }
        Ok(())
    }

    /// Whether `url` points at the configured new tab page.
    pub fn is_new_tab_url(&self, url: &Url) -> bool {
        url.scheme() == self.new_tab_url.scheme()
            && url.host_str() == self.new_tab_url.host_str()
            && url.path() == self.new_tab_url.path()
    }
}

impl LogSettings {
    pub fn level(&self) -> TabStripResult<Level> {
        self.level
            .parse::<Level>()
            .map_err(|_| TabStripError::config(format!("unknown log level '{}'", self.level)))
    }

    /// Convert into the logging setup consumed by [`crate::init_logging`].
    pub fn to_log_config(&self) -> TabStripResult<LogConfig> {
        Ok(LogConfig {
            level: self.level()?,
            format: self.format,
            filter: self.filter.clone(),
            ..LogConfig::default()
        })
    }
}
