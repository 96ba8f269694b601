use async_trait::async_trait;

use crate::Result;
use crate::models::Asset;

/// Remote storage of asset metadata.
///
/// Lookups and deletes of missing ids fail with [`crate::Error::NotFound`].
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn get_asset(&self, id: &str) -> Result<Asset>;

    async fn put_asset(&self, id: &str, asset: &Asset) -> Result<()>;

    async fn delete_asset(&self, id: &str) -> Result<()>;
}

/// Receives the assets a provider found on the data platform.
#[async_trait]
pub trait AssetCallback: Send + Sync {
    async fn on_asset_updated(&self, asset: Asset) -> Result<()>;

    async fn on_asset_deleted(&self, id: &str) -> Result<()>;
}

/// Reads assets (tables, views, schemas, ...) from a data platform or catalog,
/// converts them into [`Asset`]s and reports them to the callback.
///
/// Implementations live in connector code, one per platform.
#[async_trait]
pub trait AssetsProvider: Send + Sync {
    async fn fetch_assets(&self, callback: &dyn AssetCallback) -> Result<()>;
}
