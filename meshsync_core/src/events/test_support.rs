#![cfg(test)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::cursor::{CursorStore, MemoryCursorStore};
use super::handler::EventHandler;
use super::models::{AccessEvent, CloudEvent, EntityEvent, OutputPortEvent, TestResultsEvent};
use super::traits::EventFeed;
use crate::{Error, Result};

/// Feed that replays a fixed script of poll results and records the cursor
/// it was asked for each time. Once the script runs out it reports an empty
/// feed.
#[derive(Default)]
pub(crate) struct ScriptedFeed {
    script: Mutex<VecDeque<Result<Vec<CloudEvent>>>>,
    cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedFeed {
    pub(crate) fn new(script: impl IntoIterator<Item = Result<Vec<CloudEvent>>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            cursors: Mutex::default(),
        }
    }

    pub(crate) fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    pub(crate) fn polls(&self) -> usize {
        self.cursors.lock().unwrap().len()
    }
}

#[async_trait]
impl EventFeed for ScriptedFeed {
    async fn poll_events(&self, last_event_id: Option<&str>) -> Result<Vec<CloudEvent>> {
        self.cursors
            .lock()
            .unwrap()
            .push(last_event_id.map(str::to_string));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Feed whose poll never completes, like a request stuck on the network.
pub(crate) struct HangingFeed;

#[async_trait]
impl EventFeed for HangingFeed {
    async fn poll_events(&self, _last_event_id: Option<&str>) -> Result<Vec<CloudEvent>> {
        std::future::pending().await
    }
}

pub(crate) fn transport_error() -> Error {
    Error::transport(
        "poll events",
        std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
    )
}

/// Cursor store that refuses to persist one particular event id, simulating a
/// crash between dispatch and checkpoint.
#[derive(Default)]
pub(crate) struct FlakyCursorStore {
    pub(crate) inner: MemoryCursorStore,
    reject: Mutex<Option<String>>,
}

impl FlakyCursorStore {
    pub(crate) fn rejecting(event_id: &str) -> Self {
        Self {
            inner: MemoryCursorStore::new(),
            reject: Mutex::new(Some(event_id.to_string())),
        }
    }
}

#[async_trait]
impl CursorStore for FlakyCursorStore {
    async fn get(&self, listener_id: &str) -> Result<Option<String>> {
        self.inner.get(listener_id).await
    }

    async fn save(&self, listener_id: &str, last_event_id: &str) -> Result<()> {
        {
            let mut reject = self.reject.lock().unwrap();
            if reject.as_deref() == Some(last_event_id) {
                reject.take();
                return Err(Error::BackendMessage(format!(
                    "lost checkpoint for {last_event_id}"
                )));
            }
        }
        self.inner.save(listener_id, last_event_id).await
    }
}

/// Handler that records every callback as `"<EventName>:<payload id>"` (and
/// `"on_event:<envelope id>"` for the catch-all).
#[derive(Default)]
pub(crate) struct RecordingHandler {
    calls: Mutex<Vec<String>>,
    payloads: Mutex<Vec<Value>>,
    fail_on: Option<String>,
}

impl RecordingHandler {
    /// A handler whose kind-specific callbacks fail for the given payload id.
    pub(crate) fn failing_on(payload_id: &str) -> Self {
        Self {
            fail_on: Some(payload_id.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Serialized payloads passed to kind-specific callbacks, in call order.
    pub(crate) fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }

    fn record(&self, name: &str, id: &str, payload: Value) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(format!("{name}:{id}"));
        self.payloads.lock().unwrap().push(payload);
        if self.fail_on.as_deref() == Some(id) {
            anyhow::bail!("handler rejected {id}");
        }
        Ok(())
    }
}

macro_rules! recording_handler {
    ($($method:ident($payload:ty) => $name:literal,)*) => {
        #[async_trait]
        impl EventHandler for RecordingHandler {
            async fn on_event(&self, event: &CloudEvent) -> anyhow::Result<()> {
                self.calls.lock().unwrap().push(format!("on_event:{}", event.id));
                Ok(())
            }

            $(
                async fn $method(&self, event: &$payload) -> anyhow::Result<()> {
                    self.record($name, &event.id, serde_json::to_value(event)?)
                }
            )*
        }
    };
}

recording_handler! {
    on_data_product_created(EntityEvent) => "DataProductCreatedEvent",
    on_data_product_updated(EntityEvent) => "DataProductUpdatedEvent",
    on_data_product_deleted(EntityEvent) => "DataProductDeletedEvent",
    on_output_port_created(OutputPortEvent) => "OutputPortCreatedEvent",
    on_output_port_updated(OutputPortEvent) => "OutputPortUpdatedEvent",
    on_output_port_deleted(OutputPortEvent) => "OutputPortDeletedEvent",
    on_data_contract_created(EntityEvent) => "DataContractCreatedEvent",
    on_data_contract_updated(EntityEvent) => "DataContractUpdatedEvent",
    on_data_contract_deleted(EntityEvent) => "DataContractDeletedEvent",
    on_access_created(AccessEvent) => "AccessCreatedEvent",
    on_access_updated(AccessEvent) => "AccessUpdatedEvent",
    on_access_deleted(AccessEvent) => "AccessDeletedEvent",
    on_access_requested(AccessEvent) => "AccessRequestedEvent",
    on_access_approved(AccessEvent) => "AccessApprovedEvent",
    on_access_rejected(AccessEvent) => "AccessRejectedEvent",
    on_access_activated(AccessEvent) => "AccessActivatedEvent",
    on_access_deactivated(AccessEvent) => "AccessDeactivatedEvent",
    on_source_system_created(EntityEvent) => "SourceSystemCreatedEvent",
    on_source_system_updated(EntityEvent) => "SourceSystemUpdatedEvent",
    on_source_system_deleted(EntityEvent) => "SourceSystemDeletedEvent",
    on_team_created(EntityEvent) => "TeamCreatedEvent",
    on_team_updated(EntityEvent) => "TeamUpdatedEvent",
    on_team_deleted(EntityEvent) => "TeamDeletedEvent",
    on_definition_created(EntityEvent) => "DefinitionCreatedEvent",
    on_definition_updated(EntityEvent) => "DefinitionUpdatedEvent",
    on_definition_deleted(EntityEvent) => "DefinitionDeletedEvent",
    on_tag_created(EntityEvent) => "TagCreatedEvent",
    on_tag_updated(EntityEvent) => "TagUpdatedEvent",
    on_tag_deleted(EntityEvent) => "TagDeletedEvent",
    on_asset_created(EntityEvent) => "AssetCreatedEvent",
    on_asset_updated(EntityEvent) => "AssetUpdatedEvent",
    on_asset_deleted(EntityEvent) => "AssetDeletedEvent",
    on_test_results_created(TestResultsEvent) => "TestResultsCreatedEvent",
    on_test_results_deleted(TestResultsEvent) => "TestResultsDeletedEvent",
}
