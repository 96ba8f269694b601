use meshsync_core::events::CloudEvent;
use reqwest::Method;
use serde::Serialize;

use crate::{MeshClient, MeshError};

#[derive(Debug, Clone)]
pub struct EventsApi {
    client: MeshClient,
}

impl EventsApi {
    pub(crate) fn new(client: MeshClient) -> Self {
        Self { client }
    }

    /// Events after `last_event_id` in feed order; `None` starts from the
    /// oldest retained event.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn poll(&self, last_event_id: Option<&str>) -> Result<Vec<CloudEvent>, MeshError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Query<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            last_event_id: Option<&'a str>,
        }
        self.client
            .request_json(
                Method::GET,
                &["api", "events", "poll"],
                Some(&Query { last_event_id }),
                None::<&()>,
            )
            .await
    }
}
