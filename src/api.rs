// Raw card source: the public ArkhamDB endpoints, or an in-memory stand-in.

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{CatalogError, Result};

const CARDS_PATH: &str = "cards/";
const PACKS_PATH: &str = "packs/";

/// Where the full card and pack lists come from. Both calls return the
/// untyped upstream records; typing happens in `model::ingest_*`.
pub trait CardSource {
    /// Stable identity of this source, used as the cache key.
    fn identity(&self) -> String;

    fn fetch_cards(&self) -> Result<Vec<Value>>;

    fn fetch_packs(&self) -> Result<Vec<Value>>;
}

pub struct ArkhamDbClient {
    client: Client,
    base_url: Url,
}

impl ArkhamDbClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| CatalogError::fetch_failed("client", None, e.to_string()))?;
        Ok(ArkhamDbClient {
            client,
            base_url: config.api_base.clone(),
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::fetch_failed(path, None, e.to_string()))
    }

    fn get_list(&self, resource: &str, path: &str) -> Result<Vec<Value>> {
        let url = self.endpoint(path)?;
        info!("Fetching {resource} from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| CatalogError::fetch_failed(resource, e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::fetch_failed(
                resource,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let records: Vec<Value> = response.json().map_err(|e| {
            CatalogError::fetch_failed(resource, Some(status.as_u16()), format!("undecodable body: {e}"))
        })?;
        debug!("Received {} {resource} records", records.len());
        Ok(records)
    }
}

impl CardSource for ArkhamDbClient {
    fn identity(&self) -> String {
        self.base_url.to_string()
    }

    fn fetch_cards(&self) -> Result<Vec<Value>> {
        self.get_list("cards", CARDS_PATH)
    }

    fn fetch_packs(&self) -> Result<Vec<Value>> {
        self.get_list("packs", PACKS_PATH)
    }
}

/// Serves fixed record lists. Used for fixtures and benchmarks.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub name: String,
    pub cards: Vec<Value>,
    pub packs: Vec<Value>,
}

impl StaticSource {
    pub fn new(name: &str, cards: Vec<Value>, packs: Vec<Value>) -> Self {
        StaticSource {
            name: name.to_string(),
            cards,
            packs,
        }
    }
}

impl CardSource for StaticSource {
    fn identity(&self) -> String {
        format!("static:{}", self.name)
    }

    fn fetch_cards(&self) -> Result<Vec<Value>> {
        Ok(self.cards.clone())
    }

    fn fetch_packs(&self) -> Result<Vec<Value>> {
        Ok(self.packs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_onto_the_base() {
        let config = Config::with_base("https://arkhamdb.com/api/public").unwrap();
        let client = ArkhamDbClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(CARDS_PATH).unwrap().as_str(),
            "https://arkhamdb.com/api/public/cards/"
        );
        assert_eq!(client.identity(), "https://arkhamdb.com/api/public/");
    }
}
