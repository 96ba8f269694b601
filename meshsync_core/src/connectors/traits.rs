use async_trait::async_trait;

use crate::Result;
use crate::models::Connector;

/// Remote storage of connector identity records.
///
/// Lookups and deletes of missing ids fail with [`crate::Error::NotFound`].
#[async_trait]
pub trait ConnectorStore: Send + Sync {
    async fn get_connector(&self, id: &str) -> Result<Connector>;

    /// Create or replace the record stored under `id`.
    async fn put_connector(&self, id: &str, connector: &Connector) -> Result<()>;

    async fn delete_connector(&self, id: &str) -> Result<()>;
}
