use std::sync::Arc;

use chrono::Utc;

use super::traits::ConnectorStore;
use crate::models::{Connector, ConnectorHealth, HealthStatus};
use crate::{Error, Result};

/// Announces a connector to the remote service and publishes its health.
///
/// The id should stay constant across restarts: it identifies the connector
/// remotely and keys its persisted state. Every publication is a
/// read-modify-write of the whole record, so only one process should use a
/// given id at a time.
#[derive(Clone)]
pub struct ConnectorRegistration {
    connectors: Arc<dyn ConnectorStore>,
    connector_id: String,
    connector_type: String,
}

impl std::fmt::Debug for ConnectorRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistration")
            .field("connector_id", &self.connector_id)
            .field("connector_type", &self.connector_type)
            .finish()
    }
}

impl ConnectorRegistration {
    pub fn new(
        connectors: Arc<dyn ConnectorStore>,
        connector_id: impl Into<String>,
        connector_type: impl Into<String>,
    ) -> Result<Self> {
        let connector_id = connector_id.into();
        let connector_type = connector_type.into();
        if connector_id.trim().is_empty() {
            return Err(Error::InvalidInput("connector id is required".to_string()));
        }
        if connector_type.trim().is_empty() {
            return Err(Error::InvalidInput("connector type is required".to_string()));
        }
        Ok(Self {
            connectors,
            connector_id,
            connector_type,
        })
    }

    pub fn connector_id(&self) -> &str {
        &self.connector_id
    }

    pub fn connector_type(&self) -> &str {
        &self.connector_type
    }

    /// Create the record if it does not exist yet and mark it UP.
    ///
    /// Idempotent. An existing record keeps its `state`, so a restarted
    /// listener resumes from its stored cursor.
    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.connector_id))]
    pub async fn register(&self) -> Result<Connector> {
        tracing::debug!("checking whether connector already exists");
        let mut connector = match self.connectors.get_connector(&self.connector_id).await {
            Ok(c) => c,
            Err(e) if e.is_not_found() => Connector::new(&self.connector_id, &self.connector_type),
            Err(e) => return Err(e),
        };

        connector.id = self.connector_id.clone();
        connector.info.connector_type = self.connector_type.clone();
        connector.health = Some(ConnectorHealth {
            status: Some(HealthStatus::Up),
            started_at: Some(Utc::now()),
            updated_at: None,
            error_message: None,
        });

        tracing::info!(connector_type = %self.connector_type, "registering connector");
        self.connectors
            .put_connector(&self.connector_id, &connector)
            .await?;
        Ok(connector)
    }

    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.connector_id))]
    pub async fn up(&self) -> Result<()> {
        self.publish(HealthStatus::Up, None).await
    }

    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.connector_id))]
    pub async fn stop(&self) -> Result<()> {
        self.publish(HealthStatus::Stopped, None).await
    }

    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.connector_id))]
    pub async fn error(&self, message: &str) -> Result<()> {
        self.publish(HealthStatus::Error, Some(message.to_string()))
            .await
    }

    /// Mark the connector UP and drop its persisted state, including the
    /// event cursor. The next listener run starts from the beginning of the
    /// feed.
    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.connector_id))]
    pub async fn reset(&self) -> Result<()> {
        let mut connector = self.connectors.get_connector(&self.connector_id).await?;
        let health = connector.health_mut();
        health.status = Some(HealthStatus::Up);
        health.error_message = None;
        health.updated_at = None;
        connector.state = None;

        tracing::info!("resetting connector");
        self.connectors
            .put_connector(&self.connector_id, &connector)
            .await
    }

    /// Remove the record. Deleting an absent record is logged, not raised.
    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.connector_id))]
    pub async fn delete(&self) -> Result<()> {
        tracing::info!("deleting connector");
        match self.connectors.delete_connector(&self.connector_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::error!("connector already deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn publish(&self, status: HealthStatus, error_message: Option<String>) -> Result<()> {
        let mut connector = self.connectors.get_connector(&self.connector_id).await?;
        let health = connector.health_mut();
        health.status = Some(status);
        health.error_message = error_message;

        tracing::info!(?status, error_message = ?health.error_message, "publishing connector health");
        self.connectors
            .put_connector(&self.connector_id, &connector)
            .await
    }
}
