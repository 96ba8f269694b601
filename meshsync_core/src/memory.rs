use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::assets::traits::AssetStore;
use crate::connectors::traits::ConnectorStore;
use crate::events::models::CloudEvent;
use crate::events::traits::EventFeed;
use crate::models::{Asset, Connector};
use crate::{Error, Result};

const DEFAULT_BATCH_SIZE: usize = 100;

/// In-process stand-in for the remote service, for local development and tests.
///
/// Semantics:
/// - the feed is an append-only log; `poll_events` returns up to `batch_size`
///   events after the given id, and starts over from the beginning when the id
///   is not in the log
/// - connectors and assets are plain keyed maps
#[derive(Clone)]
pub struct MemoryBackend {
    events: Arc<Mutex<Vec<CloudEvent>>>,
    connectors: Arc<DashMap<String, Connector>>,
    assets: Arc<DashMap<String, Asset>>,
    asset_writes: Arc<AtomicUsize>,
    batch_size: usize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            events: Arc::default(),
            connectors: Arc::default(),
            assets: Arc::default(),
            asset_writes: Arc::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Append an event to the feed.
    pub async fn push_event(&self, event: CloudEvent) {
        self.events.lock().await.push(event);
    }

    /// Number of successful `put_asset` calls so far.
    pub fn asset_writes(&self) -> usize {
        self.asset_writes.load(Ordering::SeqCst)
    }

    /// Snapshot of all stored assets (primarily for tests).
    pub fn assets(&self) -> Vec<Asset> {
        self.assets.iter().map(|a| a.value().clone()).collect()
    }
}

#[async_trait]
impl EventFeed for MemoryBackend {
    async fn poll_events(&self, last_event_id: Option<&str>) -> Result<Vec<CloudEvent>> {
        let events = self.events.lock().await;
        let start = match last_event_id {
            None => 0,
            Some(id) => match events.iter().position(|e| e.id == id) {
                Some(pos) => pos + 1,
                None => {
                    tracing::warn!(last_event_id = id, "unknown cursor, replaying feed from the start");
                    0
                }
            },
        };
        Ok(events
            .iter()
            .skip(start)
            .take(self.batch_size)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConnectorStore for MemoryBackend {
    async fn get_connector(&self, id: &str) -> Result<Connector> {
        self.connectors
            .get(id)
            .map(|c| c.value().clone())
            .ok_or_else(|| Error::not_found(format!("connector {id}")))
    }

    async fn put_connector(&self, id: &str, connector: &Connector) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("connector id is empty".to_string()));
        }
        self.connectors.insert(id.to_string(), connector.clone());
        Ok(())
    }

    async fn delete_connector(&self, id: &str) -> Result<()> {
        self.connectors
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("connector {id}")))
    }
}

#[async_trait]
impl AssetStore for MemoryBackend {
    async fn get_asset(&self, id: &str) -> Result<Asset> {
        self.assets
            .get(id)
            .map(|a| a.value().clone())
            .ok_or_else(|| Error::not_found(format!("asset {id}")))
    }

    async fn put_asset(&self, id: &str, asset: &Asset) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("asset id is empty".to_string()));
        }
        self.assets.insert(id.to_string(), asset.clone());
        self.asset_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_asset(&self, id: &str) -> Result<()> {
        self.assets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("asset {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn feed_pages_after_cursor() {
        let backend = MemoryBackend::new().with_batch_size(2);
        for id in ["a", "b", "c"] {
            backend
                .push_event(CloudEvent::new(id, "TeamCreatedEvent", json!({"id": id})))
                .await;
        }

        let ids = |events: Vec<CloudEvent>| events.into_iter().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(ids(backend.poll_events(None).await.unwrap()), ["a", "b"]);
        assert_eq!(ids(backend.poll_events(Some("b")).await.unwrap()), ["c"]);
        assert!(backend.poll_events(Some("c")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let backend = MemoryBackend::new();
        assert!(backend.get_connector("x").await.unwrap_err().is_not_found());
        assert!(backend.delete_asset("x").await.unwrap_err().is_not_found());
    }
}
