//! Listing types and asset key derivation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One asset the server knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAssetDescriptor {
    pub path: String,
}

impl RemoteAssetDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The identifier this asset is tracked under.
    pub fn key(&self) -> &str {
        asset_key(&self.path)
    }
}

/// Last path segment with any query suffix removed:
/// `sprites/hero/hero_smile.png?v=2` → `hero_smile.png`.
pub fn asset_key(path: &str) -> &str {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.split('?').next().unwrap_or(last)
}

/// The set of distinct keys in a listing.
pub fn distinct_keys(assets: &[RemoteAssetDescriptor]) -> BTreeSet<&str> {
    assets.iter().map(|a| a.key()).collect()
}

/// What a listing request produced.
///
/// An empty `Listed` means the server answered and has no assets for the
/// character; `Unavailable` means no answer could be obtained. Neither
/// allows a completion decision.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetListing {
    Listed(Vec<RemoteAssetDescriptor>),
    Unavailable { reason: String },
}

impl AssetListing {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Descriptors in server order; empty when unavailable.
    pub fn descriptors(&self) -> &[RemoteAssetDescriptor] {
        match self {
            Self::Listed(assets) => assets,
            Self::Unavailable { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors().is_empty()
    }
}

impl From<Vec<RemoteAssetDescriptor>> for AssetListing {
    fn from(assets: Vec<RemoteAssetDescriptor>) -> Self {
        Self::Listed(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_last_segment_without_query() {
        assert_eq!(asset_key("sprites/hero/hero_smile.png?v=2"), "hero_smile.png");
        assert_eq!(asset_key("hero_smile.png"), "hero_smile.png");
        assert_eq!(asset_key("/characters/Hero/sad.webp"), "sad.webp");
        assert_eq!(asset_key("a/b/c.png?x=1?y=2"), "c.png");
        assert_eq!(asset_key("dir/"), "");
    }

    #[test]
    fn distinct_keys_collapse_cache_busters() {
        let assets = vec![
            RemoteAssetDescriptor::new("x/a.png?v=1"),
            RemoteAssetDescriptor::new("y/a.png?v=2"),
            RemoteAssetDescriptor::new("x/b.png"),
        ];
        assert_eq!(distinct_keys(&assets).len(), 2);
    }

    #[test]
    fn unavailable_listing_has_no_descriptors() {
        let listing = AssetListing::unavailable("timeout");
        assert!(listing.is_unavailable());
        assert!(listing.is_empty());

        let listing: AssetListing = vec![RemoteAssetDescriptor::new("a.png")].into();
        assert!(!listing.is_unavailable());
        assert_eq!(listing.descriptors().len(), 1);
    }

    #[test]
    fn descriptor_deserializes_from_server_json() {
        let assets: Vec<RemoteAssetDescriptor> = serde_json::from_str(
            r#"[{"label":"smile","path":"/characters/Hero/smile.png"}]"#,
        )
        .unwrap();
        assert_eq!(assets[0].key(), "smile.png");
    }
}
