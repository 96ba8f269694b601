use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The generic envelope every feed entry arrives in (CloudEvents structured mode).
///
/// `id` is opaque: it is only meaningful as a resume token for the feed and
/// carries no ordering by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specversion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl CloudEvent {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            source: None,
            specversion: Some("1.0".to_string()),
            time: None,
            datacontenttype: Some("application/json".to_string()),
            data,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload of events that only reference the changed entity.
///
/// Used for data products, data contracts, source systems, teams,
/// definitions, tags and assets.
///
/// Payload fields are schema-on-read: a missing field decodes to its empty
/// value, so `id` is `""` when the service omitted it or sent `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityEvent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPortEvent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default)]
    pub data_product_id: Option<String>,
}

/// Payload of every access lifecycle event (created through deactivated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default)]
    pub data_product_id: Option<String>,
    #[serde(default)]
    pub output_port_id: Option<String>,
    #[serde(default)]
    pub consumer_data_product_id: Option<String>,
    #[serde(default)]
    pub consumer_team_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultsEvent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default)]
    pub data_contract_id: Option<String>,
    #[serde(default)]
    pub data_product_id: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

/// One (entity, transition) pair the dispatcher knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DataProductCreated,
    DataProductUpdated,
    DataProductDeleted,
    OutputPortCreated,
    OutputPortUpdated,
    OutputPortDeleted,
    DataContractCreated,
    DataContractUpdated,
    DataContractDeleted,
    AccessCreated,
    AccessUpdated,
    AccessDeleted,
    AccessRequested,
    AccessApproved,
    AccessRejected,
    AccessActivated,
    AccessDeactivated,
    SourceSystemCreated,
    SourceSystemUpdated,
    SourceSystemDeleted,
    TeamCreated,
    TeamUpdated,
    TeamDeleted,
    DefinitionCreated,
    DefinitionUpdated,
    DefinitionDeleted,
    TagCreated,
    TagUpdated,
    TagDeleted,
    AssetCreated,
    AssetUpdated,
    AssetDeleted,
    TestResultsCreated,
    TestResultsDeleted,
}

impl EventKind {
    pub const ALL: [EventKind; 34] = [
        Self::DataProductCreated,
        Self::DataProductUpdated,
        Self::DataProductDeleted,
        Self::OutputPortCreated,
        Self::OutputPortUpdated,
        Self::OutputPortDeleted,
        Self::DataContractCreated,
        Self::DataContractUpdated,
        Self::DataContractDeleted,
        Self::AccessCreated,
        Self::AccessUpdated,
        Self::AccessDeleted,
        Self::AccessRequested,
        Self::AccessApproved,
        Self::AccessRejected,
        Self::AccessActivated,
        Self::AccessDeactivated,
        Self::SourceSystemCreated,
        Self::SourceSystemUpdated,
        Self::SourceSystemDeleted,
        Self::TeamCreated,
        Self::TeamUpdated,
        Self::TeamDeleted,
        Self::DefinitionCreated,
        Self::DefinitionUpdated,
        Self::DefinitionDeleted,
        Self::TagCreated,
        Self::TagUpdated,
        Self::TagDeleted,
        Self::AssetCreated,
        Self::AssetUpdated,
        Self::AssetDeleted,
        Self::TestResultsCreated,
        Self::TestResultsDeleted,
    ];

    /// The unqualified event name used as the CloudEvent type suffix.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::DataProductCreated => "DataProductCreatedEvent",
            Self::DataProductUpdated => "DataProductUpdatedEvent",
            Self::DataProductDeleted => "DataProductDeletedEvent",
            Self::OutputPortCreated => "OutputPortCreatedEvent",
            Self::OutputPortUpdated => "OutputPortUpdatedEvent",
            Self::OutputPortDeleted => "OutputPortDeletedEvent",
            Self::DataContractCreated => "DataContractCreatedEvent",
            Self::DataContractUpdated => "DataContractUpdatedEvent",
            Self::DataContractDeleted => "DataContractDeletedEvent",
            Self::AccessCreated => "AccessCreatedEvent",
            Self::AccessUpdated => "AccessUpdatedEvent",
            Self::AccessDeleted => "AccessDeletedEvent",
            Self::AccessRequested => "AccessRequestedEvent",
            Self::AccessApproved => "AccessApprovedEvent",
            Self::AccessRejected => "AccessRejectedEvent",
            Self::AccessActivated => "AccessActivatedEvent",
            Self::AccessDeactivated => "AccessDeactivatedEvent",
            Self::SourceSystemCreated => "SourceSystemCreatedEvent",
            Self::SourceSystemUpdated => "SourceSystemUpdatedEvent",
            Self::SourceSystemDeleted => "SourceSystemDeletedEvent",
            Self::TeamCreated => "TeamCreatedEvent",
            Self::TeamUpdated => "TeamUpdatedEvent",
            Self::TeamDeleted => "TeamDeletedEvent",
            Self::DefinitionCreated => "DefinitionCreatedEvent",
            Self::DefinitionUpdated => "DefinitionUpdatedEvent",
            Self::DefinitionDeleted => "DefinitionDeletedEvent",
            Self::TagCreated => "TagCreatedEvent",
            Self::TagUpdated => "TagUpdatedEvent",
            Self::TagDeleted => "TagDeletedEvent",
            Self::AssetCreated => "AssetCreatedEvent",
            Self::AssetUpdated => "AssetUpdatedEvent",
            Self::AssetDeleted => "AssetDeletedEvent",
            Self::TestResultsCreated => "TestResultsCreatedEvent",
            Self::TestResultsDeleted => "TestResultsDeletedEvent",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A decoded domain event. Variants mirror [`EventKind`] one to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    DataProductCreated(EntityEvent),
    DataProductUpdated(EntityEvent),
    DataProductDeleted(EntityEvent),
    OutputPortCreated(OutputPortEvent),
    OutputPortUpdated(OutputPortEvent),
    OutputPortDeleted(OutputPortEvent),
    DataContractCreated(EntityEvent),
    DataContractUpdated(EntityEvent),
    DataContractDeleted(EntityEvent),
    AccessCreated(AccessEvent),
    AccessUpdated(AccessEvent),
    AccessDeleted(AccessEvent),
    AccessRequested(AccessEvent),
    AccessApproved(AccessEvent),
    AccessRejected(AccessEvent),
    AccessActivated(AccessEvent),
    AccessDeactivated(AccessEvent),
    SourceSystemCreated(EntityEvent),
    SourceSystemUpdated(EntityEvent),
    SourceSystemDeleted(EntityEvent),
    TeamCreated(EntityEvent),
    TeamUpdated(EntityEvent),
    TeamDeleted(EntityEvent),
    DefinitionCreated(EntityEvent),
    DefinitionUpdated(EntityEvent),
    DefinitionDeleted(EntityEvent),
    TagCreated(EntityEvent),
    TagUpdated(EntityEvent),
    TagDeleted(EntityEvent),
    AssetCreated(EntityEvent),
    AssetUpdated(EntityEvent),
    AssetDeleted(EntityEvent),
    TestResultsCreated(TestResultsEvent),
    TestResultsDeleted(TestResultsEvent),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DataProductCreated(_) => EventKind::DataProductCreated,
            Self::DataProductUpdated(_) => EventKind::DataProductUpdated,
            Self::DataProductDeleted(_) => EventKind::DataProductDeleted,
            Self::OutputPortCreated(_) => EventKind::OutputPortCreated,
            Self::OutputPortUpdated(_) => EventKind::OutputPortUpdated,
            Self::OutputPortDeleted(_) => EventKind::OutputPortDeleted,
            Self::DataContractCreated(_) => EventKind::DataContractCreated,
            Self::DataContractUpdated(_) => EventKind::DataContractUpdated,
            Self::DataContractDeleted(_) => EventKind::DataContractDeleted,
            Self::AccessCreated(_) => EventKind::AccessCreated,
            Self::AccessUpdated(_) => EventKind::AccessUpdated,
            Self::AccessDeleted(_) => EventKind::AccessDeleted,
            Self::AccessRequested(_) => EventKind::AccessRequested,
            Self::AccessApproved(_) => EventKind::AccessApproved,
            Self::AccessRejected(_) => EventKind::AccessRejected,
            Self::AccessActivated(_) => EventKind::AccessActivated,
            Self::AccessDeactivated(_) => EventKind::AccessDeactivated,
            Self::SourceSystemCreated(_) => EventKind::SourceSystemCreated,
            Self::SourceSystemUpdated(_) => EventKind::SourceSystemUpdated,
            Self::SourceSystemDeleted(_) => EventKind::SourceSystemDeleted,
            Self::TeamCreated(_) => EventKind::TeamCreated,
            Self::TeamUpdated(_) => EventKind::TeamUpdated,
            Self::TeamDeleted(_) => EventKind::TeamDeleted,
            Self::DefinitionCreated(_) => EventKind::DefinitionCreated,
            Self::DefinitionUpdated(_) => EventKind::DefinitionUpdated,
            Self::DefinitionDeleted(_) => EventKind::DefinitionDeleted,
            Self::TagCreated(_) => EventKind::TagCreated,
            Self::TagUpdated(_) => EventKind::TagUpdated,
            Self::TagDeleted(_) => EventKind::TagDeleted,
            Self::AssetCreated(_) => EventKind::AssetCreated,
            Self::AssetUpdated(_) => EventKind::AssetUpdated,
            Self::AssetDeleted(_) => EventKind::AssetDeleted,
            Self::TestResultsCreated(_) => EventKind::TestResultsCreated,
            Self::TestResultsDeleted(_) => EventKind::TestResultsDeleted,
        }
    }
}
