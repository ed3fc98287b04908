use std::{env, path::PathBuf};

use tracing::{info, warn};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://arkhamdb.com/api/public";
pub const DEFAULT_USER_AGENT: &str = "ArkhamCatalog/0.1-Rust (card browser)";
pub const DEFAULT_SELECTION_PATH: &str = "selected_expansions.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: Url,
    pub user_agent: String,
    /// File backing the persisted expansion selection.
    pub selection_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let api_base = match base_url(&load_or_default("ARKHAM_API_BASE", DEFAULT_API_BASE)) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid ARKHAM_API_BASE value: {e}, using default");
                default_base()
            }
        };

        Self {
            api_base,
            user_agent: load_or_default("ARKHAM_USER_AGENT", DEFAULT_USER_AGENT),
            selection_path: load_or_default("ARKHAM_SELECTION_PATH", DEFAULT_SELECTION_PATH).into(),
        }
    }

    /// Defaults everywhere except the API base.
    pub fn with_base(api_base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            api_base: base_url(api_base)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            selection_path: DEFAULT_SELECTION_PATH.into(),
        })
    }
}

fn load_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}

// Url::join drops the last path segment unless the base ends in a slash.
fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

fn default_base() -> Url {
    base_url(DEFAULT_API_BASE).expect("Default API base misconfigured!")
}
