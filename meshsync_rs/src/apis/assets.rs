use meshsync_core::models::Asset;
use reqwest::Method;

use crate::{MeshClient, MeshError};

#[derive(Debug, Clone)]
pub struct AssetsApi {
    client: MeshClient,
}

impl AssetsApi {
    pub(crate) fn new(client: MeshClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Asset, MeshError> {
        self.client
            .request_json(Method::GET, &["api", "assets", id], None::<&()>, None::<&()>)
            .await
    }

    #[tracing::instrument(level = "debug", skip(self, asset))]
    pub async fn put(&self, id: &str, asset: &Asset) -> Result<(), MeshError> {
        self.client
            .request_unit(Method::PUT, &["api", "assets", id], Some(asset))
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), MeshError> {
        self.client
            .request_unit(Method::DELETE, &["api", "assets", id], None::<&()>)
            .await
    }
}
