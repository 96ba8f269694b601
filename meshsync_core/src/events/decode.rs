//! Envelope decoding: maps a `CloudEvent` type tag onto the typed schema table.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::models::{CloudEvent, DomainEvent, EventKind};
use crate::{Error, Result};

/// Event names the service still emits but that have been superseded by the
/// access events. They are acknowledged and skipped.
const DEPRECATED_TYPE_NAMES: &[&str] = &[
    "DataUsageAgreementCreatedEvent",
    "DataUsageAgreementUpdatedEvent",
    "DataUsageAgreementDeletedEvent",
    "DataUsageAgreementRequestedEvent",
    "DataUsageAgreementApprovedEvent",
    "DataUsageAgreementRejectedEvent",
    "DataUsageAgreementActivatedEvent",
    "DataUsageAgreementDeactivatedEvent",
];

/// Outcome of decoding one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Known(DomainEvent),
    /// A recognised but deprecated event type.
    Deprecated,
    /// A type tag outside the schema table.
    Unknown,
}

/// Strips the CloudEvents namespace, e.g.
/// `com.datamesh-manager.events.TeamCreatedEvent` -> `TeamCreatedEvent`.
pub fn type_name(event_type: &str) -> &str {
    event_type.rsplit('.').next().unwrap_or(event_type)
}

/// Decode an envelope into a typed event.
///
/// Unknown payload fields are ignored and missing ones take their empty
/// value. A payload of the wrong shape for a known type (a non-object `data`,
/// a field of the wrong JSON type) yields [`Error::Decode`].
#[tracing::instrument(level = "debug", skip_all, fields(event_id = %event.id, event_type = %event.event_type))]
pub fn decode(event: &CloudEvent) -> Result<Decoded> {
    let name = type_name(&event.event_type);
    let Some(kind) = EventKind::from_type_name(name) else {
        if DEPRECATED_TYPE_NAMES.contains(&name) {
            return Ok(Decoded::Deprecated);
        }
        return Ok(Decoded::Unknown);
    };

    let decoded = match kind {
        EventKind::DataProductCreated => DomainEvent::DataProductCreated(payload(event)?),
        EventKind::DataProductUpdated => DomainEvent::DataProductUpdated(payload(event)?),
        EventKind::DataProductDeleted => DomainEvent::DataProductDeleted(payload(event)?),
        EventKind::OutputPortCreated => DomainEvent::OutputPortCreated(payload(event)?),
        EventKind::OutputPortUpdated => DomainEvent::OutputPortUpdated(payload(event)?),
        EventKind::OutputPortDeleted => DomainEvent::OutputPortDeleted(payload(event)?),
        EventKind::DataContractCreated => DomainEvent::DataContractCreated(payload(event)?),
        EventKind::DataContractUpdated => DomainEvent::DataContractUpdated(payload(event)?),
        EventKind::DataContractDeleted => DomainEvent::DataContractDeleted(payload(event)?),
        EventKind::AccessCreated => DomainEvent::AccessCreated(payload(event)?),
        EventKind::AccessUpdated => DomainEvent::AccessUpdated(payload(event)?),
        EventKind::AccessDeleted => DomainEvent::AccessDeleted(payload(event)?),
        EventKind::AccessRequested => DomainEvent::AccessRequested(payload(event)?),
        EventKind::AccessApproved => DomainEvent::AccessApproved(payload(event)?),
        EventKind::AccessRejected => DomainEvent::AccessRejected(payload(event)?),
        EventKind::AccessActivated => DomainEvent::AccessActivated(payload(event)?),
        EventKind::AccessDeactivated => DomainEvent::AccessDeactivated(payload(event)?),
        EventKind::SourceSystemCreated => DomainEvent::SourceSystemCreated(payload(event)?),
        EventKind::SourceSystemUpdated => DomainEvent::SourceSystemUpdated(payload(event)?),
        EventKind::SourceSystemDeleted => DomainEvent::SourceSystemDeleted(payload(event)?),
        EventKind::TeamCreated => DomainEvent::TeamCreated(payload(event)?),
        EventKind::TeamUpdated => DomainEvent::TeamUpdated(payload(event)?),
        EventKind::TeamDeleted => DomainEvent::TeamDeleted(payload(event)?),
        EventKind::DefinitionCreated => DomainEvent::DefinitionCreated(payload(event)?),
        EventKind::DefinitionUpdated => DomainEvent::DefinitionUpdated(payload(event)?),
        EventKind::DefinitionDeleted => DomainEvent::DefinitionDeleted(payload(event)?),
        EventKind::TagCreated => DomainEvent::TagCreated(payload(event)?),
        EventKind::TagUpdated => DomainEvent::TagUpdated(payload(event)?),
        EventKind::TagDeleted => DomainEvent::TagDeleted(payload(event)?),
        EventKind::AssetCreated => DomainEvent::AssetCreated(payload(event)?),
        EventKind::AssetUpdated => DomainEvent::AssetUpdated(payload(event)?),
        EventKind::AssetDeleted => DomainEvent::AssetDeleted(payload(event)?),
        EventKind::TestResultsCreated => DomainEvent::TestResultsCreated(payload(event)?),
        EventKind::TestResultsDeleted => DomainEvent::TestResultsDeleted(payload(event)?),
    };
    Ok(Decoded::Known(decoded))
}

/// Missing or `null` data decodes like an empty object; any other non-object
/// payload is rejected.
fn payload<T: DeserializeOwned>(event: &CloudEvent) -> Result<T> {
    let decoded = match &event.data {
        Value::Null => T::deserialize(&Value::Object(Map::new())),
        data @ Value::Object(_) => T::deserialize(data),
        other => Err(serde::de::Error::custom(format!(
            "expected an object payload, found {other}"
        ))),
    };
    decoded.map_err(|source| Error::Decode {
        event_id: event.id.clone(),
        event_type: event.event_type.clone(),
        source,
    })
}
