//! `MeshClient` as the remote collaborator of the core listener, registration
//! and assets synchronizer.

use async_trait::async_trait;
use meshsync_core::events::{CloudEvent, EventFeed};
use meshsync_core::models::{Asset, Connector};
use meshsync_core::{AssetStore, ConnectorStore, Result};

use crate::MeshClient;

#[async_trait]
impl EventFeed for MeshClient {
    async fn poll_events(&self, last_event_id: Option<&str>) -> Result<Vec<CloudEvent>> {
        tracing::info!(last_event_id = ?last_event_id, "fetching events");
        Ok(self.events().poll(last_event_id).await?)
    }
}

#[async_trait]
impl ConnectorStore for MeshClient {
    async fn get_connector(&self, id: &str) -> Result<Connector> {
        Ok(self.connectors().get(id).await?)
    }

    async fn put_connector(&self, id: &str, connector: &Connector) -> Result<()> {
        Ok(self.connectors().put(id, connector).await?)
    }

    async fn delete_connector(&self, id: &str) -> Result<()> {
        Ok(self.connectors().delete(id).await?)
    }
}

#[async_trait]
impl AssetStore for MeshClient {
    async fn get_asset(&self, id: &str) -> Result<Asset> {
        Ok(self.assets().get(id).await?)
    }

    async fn put_asset(&self, id: &str, asset: &Asset) -> Result<()> {
        Ok(self.assets().put(id, asset).await?)
    }

    async fn delete_asset(&self, id: &str) -> Result<()> {
        Ok(self.assets().delete(id).await?)
    }
}
