//! Remote asset server, keyed by content hash.

use crate::config::ConvertConfig;
use crate::error::Result;

/// Fetches assets over HTTP. Nothing is cached; every call is a fresh
/// round-trip, so repeated fetches of one name return the same bytes as
/// long as the server does.
#[derive(Debug, Clone)]
pub struct RemoteAssetServer {
    url_template: String,
    #[cfg(feature = "remote")]
    http: reqwest::Client,
}

impl RemoteAssetServer {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            url_template: config.asset_url_template.clone(),
            #[cfg(feature = "remote")]
            http: reqwest::Client::new(),
        }
    }

    /// URL requested for an asset name.
    pub fn url_for(&self, name: &str) -> String {
        self.url_template.replace("{name}", name)
    }

    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        #[cfg(feature = "remote")]
        {
            fetcher::fetch(&self.http, &self.url_for(name), name).await
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(crate::error::ConvertError::Unsupported(format!(
                "fetching remote asset {name} requires the 'remote' feature"
            )))
        }
    }
}

// ============================================================================
// HTTP FETCH (requires remote feature)
// ============================================================================

#[cfg(feature = "remote")]
mod fetcher {
    use crate::error::{ConvertError, Result};
    use reqwest::StatusCode;

    pub async fn fetch(http: &reqwest::Client, url: &str, name: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "fetching remote asset");

        let response = http
            .get(url)
            .send()
            .await
            .map_err(|e| ConvertError::http(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ConvertError::AssetNotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(ConvertError::http(format!(
                "Asset server returned {status} for {name}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ConvertError::http(format!("Failed to read {url}: {e}")))?;
        Ok(body.to_vec())
    }
}
