use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::Result;
use crate::connectors::traits::ConnectorStore;

/// Key under which the remote store keeps the cursor in the connector state.
pub const LAST_EVENT_ID_KEY: &str = "lastEventId";

/// Persists the id of the last event a listener processed.
///
/// Exactly one listener instance writes a given `listener_id`; stores only
/// guarantee read-after-write for that single writer.
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn get(&self, listener_id: &str) -> Result<Option<String>>;

    async fn save(&self, listener_id: &str, last_event_id: &str) -> Result<()>;
}

/// Process-local cursor store. Progress is lost on restart.
#[derive(Clone, Default)]
pub struct MemoryCursorStore {
    cursors: Arc<DashMap<String, String>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn get(&self, listener_id: &str) -> Result<Option<String>> {
        Ok(self.cursors.get(listener_id).map(|c| c.value().clone()))
    }

    async fn save(&self, listener_id: &str, last_event_id: &str) -> Result<()> {
        self.cursors
            .insert(listener_id.to_string(), last_event_id.to_string());
        Ok(())
    }
}

/// Keeps the cursor in the `state` of the connector record whose id equals the
/// listener id, so progress survives restarts.
///
/// `save` is a read-modify-write of the whole record without locking; other
/// keys in `state` are preserved.
#[derive(Clone)]
pub struct RemoteCursorStore {
    connectors: Arc<dyn ConnectorStore>,
}

impl RemoteCursorStore {
    pub fn new(connectors: Arc<dyn ConnectorStore>) -> Self {
        Self { connectors }
    }
}

#[async_trait]
impl CursorStore for RemoteCursorStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, listener_id: &str) -> Result<Option<String>> {
        let connector = match self.connectors.get_connector(listener_id).await {
            Ok(c) => c,
            Err(e) if e.is_not_found() => {
                tracing::debug!(listener_id, "no connector record yet, starting from the beginning");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(connector
            .state
            .as_ref()
            .and_then(|s| s.get(LAST_EVENT_ID_KEY))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn save(&self, listener_id: &str, last_event_id: &str) -> Result<()> {
        let mut connector = match self.connectors.get_connector(listener_id).await {
            Ok(c) => c,
            Err(e) => {
                if e.is_not_found() {
                    tracing::error!(
                        listener_id,
                        "connector not found, register it before saving state"
                    );
                }
                return Err(e);
            }
        };
        connector.state.get_or_insert_with(Map::new).insert(
            LAST_EVENT_ID_KEY.to_string(),
            Value::String(last_event_id.to_string()),
        );
        self.connectors.put_connector(listener_id, &connector).await
    }
}
