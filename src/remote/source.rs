//! Listing source trait and the in-memory source

use super::listing::{AssetListing, RemoteAssetDescriptor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Where asset listings come from.
///
/// Never fails: transport problems are reported as
/// `AssetListing::Unavailable` so callers can treat them as "no decision".
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch_remote_assets(&self, display_name: &str) -> AssetListing;
}

/// Listings held in memory, keyed by character display name.
///
/// Unknown names list as empty. A source switched to failing answers
/// `Unavailable` for every name.
#[derive(Debug, Default)]
pub struct StaticAssetSource {
    listings: Mutex<HashMap<String, Vec<RemoteAssetDescriptor>>>,
    failing: Mutex<Option<String>>,
    fetches: Mutex<usize>,
}

impl StaticAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets<I, S>(self, display_name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_assets(display_name, paths);
        self
    }

    pub fn set_assets<I, S>(&self, display_name: impl Into<String>, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets = paths.into_iter().map(RemoteAssetDescriptor::new).collect();
        if let Ok(mut listings) = self.listings.lock() {
            listings.insert(display_name.into(), assets);
        }
    }

    /// Answer every request with `Unavailable { reason }`; `None` restores.
    pub fn set_failing(&self, reason: Option<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            *failing = reason;
        }
    }

    /// Load a listing file: a JSON array of `{ "path": … }` for one name.
    pub fn from_file(
        display_name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let assets: Vec<RemoteAssetDescriptor> = serde_json::from_str(&raw)?;
        let source = Self::new();
        if let Ok(mut listings) = source.listings.lock() {
            listings.insert(display_name.into(), assets);
        }
        Ok(source)
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().map(|n| *n).unwrap_or(0)
    }
}

#[async_trait]
impl AssetSource for StaticAssetSource {
    async fn fetch_remote_assets(&self, display_name: &str) -> AssetListing {
        if let Ok(mut n) = self.fetches.lock() {
            *n += 1;
        }
        let failing = self.failing.lock().ok().and_then(|f| f.clone());
        if let Some(reason) = failing {
            return AssetListing::unavailable(reason);
        }
        let assets = self
            .listings
            .lock()
            .ok()
            .and_then(|l| l.get(display_name).cloned())
            .unwrap_or_default();
        AssetListing::Listed(assets)
    }
}
