use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to fetch {resource}: {}", fetch_detail(.status, .message))]
    FetchFailed {
        resource: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Missing facet parameter: {0}")]
    MissingFacetParameter(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fetch_detail(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("API error: {code} - {message}"),
        None => message.to_string(),
    }
}

impl CatalogError {
    pub fn fetch_failed(resource: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        CatalogError::FetchFailed {
            resource: resource.to_string(),
            status,
            message: message.into(),
        }
    }

    /// Copy of this error for handing to another waiter on the same fetch.
    ///
    /// Only `FetchFailed` comes out of a catalog load; anything else is
    /// flattened into one with its message preserved.
    pub fn duplicate(&self) -> Self {
        match self {
            CatalogError::FetchFailed {
                resource,
                status,
                message,
            } => CatalogError::FetchFailed {
                resource: resource.clone(),
                status: *status,
                message: message.clone(),
            },
            other => CatalogError::fetch_failed("catalog", None, other.to_string()),
        }
    }

    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, CatalogError::FetchFailed { .. })
    }
}
