use meshsync_core::models::Connector;
use reqwest::Method;

use crate::{MeshClient, MeshError};

#[derive(Debug, Clone)]
pub struct ConnectorsApi {
    client: MeshClient,
}

impl ConnectorsApi {
    pub(crate) fn new(client: MeshClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Connector, MeshError> {
        self.client
            .request_json(Method::GET, &["api", "connectors", id], None::<&()>, None::<&()>)
            .await
    }

    #[tracing::instrument(level = "debug", skip(self, connector))]
    pub async fn put(&self, id: &str, connector: &Connector) -> Result<(), MeshError> {
        self.client
            .request_unit(Method::PUT, &["api", "connectors", id], Some(connector))
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), MeshError> {
        self.client
            .request_unit(Method::DELETE, &["api", "connectors", id], None::<&()>)
            .await
    }
}
