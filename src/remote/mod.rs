//! Remote asset listings
//!
//! The host server knows which asset files belong to a character. The
//! tracker asks for that list whenever it needs a total and never keeps it
//! beyond the operation that fetched it.

#[cfg(feature = "http")]
mod http;
mod listing;
mod source;

#[cfg(feature = "http")]
pub use http::HttpAssetSource;
pub use listing::{asset_key, distinct_keys, AssetListing, RemoteAssetDescriptor};
pub use source::{AssetSource, StaticAssetSource};
