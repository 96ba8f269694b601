use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Health status reported for a registered connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Up,
    Stopped,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorHealth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<HealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorInfo {
    /// Connector type, e.g. `databricks-assets`, `snowflake-access`, `event-listener`.
    #[serde(rename = "type", default)]
    pub connector_type: String,
}

/// The identity record of a running connector in Data Mesh Manager.
///
/// `state` is an opaque map owned by the connector; the remote cursor store
/// keeps the last processed event id in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: String,
    #[serde(default)]
    pub info: ConnectorInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<ConnectorHealth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Map<String, Value>>,
}

impl Connector {
    pub fn new(id: impl Into<String>, connector_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            info: ConnectorInfo {
                connector_type: connector_type.into(),
            },
            health: None,
            state: None,
        }
    }

    /// Mutable access to the health block, creating an empty one if absent.
    pub fn health_mut(&mut self) -> &mut ConnectorHealth {
        self.health.get_or_insert_with(ConnectorHealth::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    /// Source platform, e.g. `snowflake`, `unity`, `glue`.
    #[serde(default)]
    pub source: String,
    /// Asset type within the source, e.g. `snowflake_table`.
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetColumn {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A physical data asset (table, view, schema, topic, ...) synchronized from
/// the data platform into Data Mesh Manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub info: AssetInfo,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<AssetColumn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_tolerates_unknown_fields() {
        let c: Connector = serde_json::from_value(serde_json::json!({
            "id": "c-1",
            "info": {"type": "event-listener", "version": "2"},
            "health": {"status": "UP", "lastHeartbeat": 12},
            "owner": "team-a",
        }))
        .unwrap();
        assert_eq!(c.info.connector_type, "event-listener");
        assert_eq!(c.health.unwrap().status, Some(HealthStatus::Up));
        assert!(c.state.is_none());
    }

    #[test]
    fn health_status_serializes_upper_case() {
        let v = serde_json::to_value(HealthStatus::Stopped).unwrap();
        assert_eq!(v, serde_json::json!("STOPPED"));
    }
}
