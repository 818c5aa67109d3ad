//! Listing source backed by the host's sprite endpoint

use super::listing::{AssetListing, RemoteAssetDescriptor};
use super::source::AssetSource;
use async_trait::async_trait;
use std::time::Duration;

const LISTING_PATH: &str = "/api/sprites/get";

/// Fetches `GET {base_url}/api/sprites/get?name=<display name>`.
#[derive(Clone)]
pub struct HttpAssetSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn listing_url(&self) -> String {
        format!("{}{}", self.base_url, LISTING_PATH)
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch_remote_assets(&self, display_name: &str) -> AssetListing {
        let response = match self
            .client
            .get(self.listing_url())
            .query(&[("name", display_name)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(name = display_name, error = %e, "asset listing request failed");
                return AssetListing::unavailable(e.to_string());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(name = display_name, %status, "asset listing returned an error status");
            return AssetListing::unavailable(format!("status {}", status));
        }

        match response.json::<Vec<RemoteAssetDescriptor>>().await {
            Ok(assets) => AssetListing::Listed(assets),
            Err(e) => {
                tracing::warn!(name = display_name, error = %e, "asset listing was not valid JSON");
                AssetListing::unavailable(e.to_string())
            }
        }
    }
}
