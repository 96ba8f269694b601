use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{MeshError, MeshErrorKind};

const API_KEY_HEADER: &str = "x-api-key";

/// Thin typed client for the Data Mesh Manager REST API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct MeshClient {
    base_url: Url,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl MeshClient {
    pub fn new(config: &ClientConfig) -> Result<Self, MeshError> {
        config.validate()?;
        let base_url = Url::parse(config.host.trim_end_matches('/')).map_err(|e| {
            MeshError::new(MeshErrorKind::Config, None, format!("invalid host: {e}"))
        })?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            http,
        })
    }

    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self, MeshError> {
        Self::new(&ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn headers(&self) -> Result<HeaderMap, MeshError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(api_key) = self.api_key.as_deref() {
            let value = HeaderValue::from_str(api_key).map_err(|e| {
                MeshError::new(MeshErrorKind::Config, None, format!("invalid api key: {e}"))
            })?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }
        Ok(headers)
    }

    /// Appends percent-encoded path segments to the base URL.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, MeshError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MeshError::new(MeshErrorKind::Config, None, "host cannot be a base URL")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: Option<&impl Serialize>,
        body: Option<&impl Serialize>,
    ) -> Result<Response, MeshError> {
        let mut req = self.http.request(method, url).headers(self.headers()?);
        if let Some(q) = query {
            req = req.query(q);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        Ok(req.send().await?)
    }

    pub(crate) async fn map_error(&self, resp: Response) -> MeshError {
        let status = resp.status();
        let code = status.as_u16();
        let text = resp.text().await.unwrap_or_default();
        let kind = match code {
            404 => MeshErrorKind::NotFound,
            401 | 403 => MeshErrorKind::Auth,
            400..=499 => MeshErrorKind::Validation,
            _ => MeshErrorKind::Server,
        };
        MeshError::new(
            kind,
            Some(code),
            if text.is_empty() {
                status.to_string()
            } else {
                text
            },
        )
    }

    /// Send a request and decode the JSON response body.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&impl Serialize>,
        body: Option<&impl Serialize>,
    ) -> Result<T, MeshError> {
        let resp = self.send(method, self.url(segments)?, query, body).await?;
        if !resp.status().is_success() {
            return Err(self.map_error(resp).await);
        }
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request whose response body is irrelevant.
    pub async fn request_unit(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&impl Serialize>,
    ) -> Result<(), MeshError> {
        let resp = self
            .send(method, self.url(segments)?, None::<&()>, body)
            .await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(self.map_error(resp).await)
    }

    pub fn events(&self) -> crate::apis::EventsApi {
        crate::apis::EventsApi::new(self.clone())
    }

    pub fn connectors(&self) -> crate::apis::ConnectorsApi {
        crate::apis::ConnectorsApi::new(self.clone())
    }

    pub fn assets(&self) -> crate::apis::AssetsApi {
        crate::apis::AssetsApi::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn trims_trailing_slash() {
        let c = MeshClient::new(&ClientConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(c.base_url(), "http://localhost:8000");
    }

    #[test]
    fn encodes_path_segments() {
        let c = MeshClient::new(&ClientConfig::new("https://example.com/dmm/")).unwrap();
        let url = c.url(&["api", "assets", "db/orders table"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/dmm/api/assets/db%2Forders%20table"
        );
    }

    #[tokio::test]
    async fn sends_api_key_and_maps_status_codes() {
        let server = MockServer::start_async().await;
        let ok = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/connectors/c-1")
                    .header("x-api-key", "secret");
                then.status(200).json_body(json!({"id": "c-1"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/connectors/missing");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/connectors/locked");
                then.status(403).body("forbidden");
            })
            .await;

        let client =
            MeshClient::new(&ClientConfig::new(server.base_url()).with_api_key("secret")).unwrap();

        let body: Value = client
            .request_json(Method::GET, &["api", "connectors", "c-1"], None::<&()>, None::<&()>)
            .await
            .unwrap();
        assert_eq!(body["id"], json!("c-1"));
        ok.assert_async().await;

        let err = client
            .request_json::<Value>(Method::GET, &["api", "connectors", "missing"], None::<&()>, None::<&()>)
            .await
            .unwrap_err();
        assert_eq!(err.kind, MeshErrorKind::NotFound);
        assert_eq!(err.status, Some(404));

        let err = client
            .request_json::<Value>(Method::GET, &["api", "connectors", "locked"], None::<&()>, None::<&()>)
            .await
            .unwrap_err();
        assert_eq!(err.kind, MeshErrorKind::Auth);
        assert_eq!(err.message, "forbidden");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let client = MeshClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        let err = client
            .request_unit(Method::DELETE, &["api", "assets", "a"], None::<&()>)
            .await
            .unwrap_err();
        assert_eq!(err.kind, MeshErrorKind::Transport);
    }
}
