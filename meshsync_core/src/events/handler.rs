use async_trait::async_trait;

use super::decode::Decoded;
use super::models::{
    AccessEvent, CloudEvent, DomainEvent, EntityEvent, OutputPortEvent, TestResultsEvent,
};
use crate::{Error, Result};

/// Callbacks invoked by the event listener.
///
/// Every method defaults to a no-op, so implementations only override the
/// kinds they care about. `on_event` runs first for every envelope, including
/// unknown and deprecated types.
///
/// Delivery is at-least-once: after a crash or a failed checkpoint the same
/// event may be delivered again, so handlers must tolerate duplicates.
#[async_trait]
#[allow(unused_variables)]
pub trait EventHandler: Send + Sync {
    async fn on_event(&self, event: &CloudEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_data_product_created(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_data_product_updated(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_data_product_deleted(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_output_port_created(&self, event: &OutputPortEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_output_port_updated(&self, event: &OutputPortEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_output_port_deleted(&self, event: &OutputPortEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_data_contract_created(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_data_contract_updated(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_data_contract_deleted(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_created(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_updated(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_deleted(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_requested(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_approved(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_rejected(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_activated(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_access_deactivated(&self, event: &AccessEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_source_system_created(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_source_system_updated(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_source_system_deleted(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_team_created(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_team_updated(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_team_deleted(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_definition_created(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_definition_updated(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_definition_deleted(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_tag_created(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_tag_updated(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_tag_deleted(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_asset_created(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_asset_updated(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_asset_deleted(&self, event: &EntityEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_test_results_created(&self, event: &TestResultsEvent) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_test_results_deleted(&self, event: &TestResultsEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Invoke `on_event` and then the kind-specific callback for a decoded event.
///
/// Unknown and deprecated envelopes only reach `on_event`.
#[tracing::instrument(level = "debug", skip_all, fields(event_id = %envelope.id, event_type = %envelope.event_type))]
pub async fn dispatch(
    handler: &dyn EventHandler,
    envelope: &CloudEvent,
    decoded: &Decoded,
) -> Result<()> {
    handler
        .on_event(envelope)
        .await
        .map_err(|source| handler_error(envelope, source))?;

    let Decoded::Known(event) = decoded else {
        return Ok(());
    };

    let res = match event {
        DomainEvent::DataProductCreated(e) => handler.on_data_product_created(e).await,
        DomainEvent::DataProductUpdated(e) => handler.on_data_product_updated(e).await,
        DomainEvent::DataProductDeleted(e) => handler.on_data_product_deleted(e).await,
        DomainEvent::OutputPortCreated(e) => handler.on_output_port_created(e).await,
        DomainEvent::OutputPortUpdated(e) => handler.on_output_port_updated(e).await,
        DomainEvent::OutputPortDeleted(e) => handler.on_output_port_deleted(e).await,
        DomainEvent::DataContractCreated(e) => handler.on_data_contract_created(e).await,
        DomainEvent::DataContractUpdated(e) => handler.on_data_contract_updated(e).await,
        DomainEvent::DataContractDeleted(e) => handler.on_data_contract_deleted(e).await,
        DomainEvent::AccessCreated(e) => handler.on_access_created(e).await,
        DomainEvent::AccessUpdated(e) => handler.on_access_updated(e).await,
        DomainEvent::AccessDeleted(e) => handler.on_access_deleted(e).await,
        DomainEvent::AccessRequested(e) => handler.on_access_requested(e).await,
        DomainEvent::AccessApproved(e) => handler.on_access_approved(e).await,
        DomainEvent::AccessRejected(e) => handler.on_access_rejected(e).await,
        DomainEvent::AccessActivated(e) => handler.on_access_activated(e).await,
        DomainEvent::AccessDeactivated(e) => handler.on_access_deactivated(e).await,
        DomainEvent::SourceSystemCreated(e) => handler.on_source_system_created(e).await,
        DomainEvent::SourceSystemUpdated(e) => handler.on_source_system_updated(e).await,
        DomainEvent::SourceSystemDeleted(e) => handler.on_source_system_deleted(e).await,
        DomainEvent::TeamCreated(e) => handler.on_team_created(e).await,
        DomainEvent::TeamUpdated(e) => handler.on_team_updated(e).await,
        DomainEvent::TeamDeleted(e) => handler.on_team_deleted(e).await,
        DomainEvent::DefinitionCreated(e) => handler.on_definition_created(e).await,
        DomainEvent::DefinitionUpdated(e) => handler.on_definition_updated(e).await,
        DomainEvent::DefinitionDeleted(e) => handler.on_definition_deleted(e).await,
        DomainEvent::TagCreated(e) => handler.on_tag_created(e).await,
        DomainEvent::TagUpdated(e) => handler.on_tag_updated(e).await,
        DomainEvent::TagDeleted(e) => handler.on_tag_deleted(e).await,
        DomainEvent::AssetCreated(e) => handler.on_asset_created(e).await,
        DomainEvent::AssetUpdated(e) => handler.on_asset_updated(e).await,
        DomainEvent::AssetDeleted(e) => handler.on_asset_deleted(e).await,
        DomainEvent::TestResultsCreated(e) => handler.on_test_results_created(e).await,
        DomainEvent::TestResultsDeleted(e) => handler.on_test_results_deleted(e).await,
    };
    res.map_err(|source| handler_error(envelope, source))
}

fn handler_error(envelope: &CloudEvent, source: anyhow::Error) -> Error {
    Error::Handler {
        event_id: envelope.id.clone(),
        event_type: envelope.event_type.clone(),
        source,
    }
}
