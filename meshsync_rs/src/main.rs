use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use meshsync_core::events::{
    AccessEvent, CloudEvent, CursorStore, EventHandler, EventListener, ListenerConfig,
    MemoryCursorStore, RemoteCursorStore,
};
use meshsync_core::ConnectorRegistration;
use meshsync_rs::{ClientConfig, MeshClient};

#[derive(Debug, Parser)]
#[command(name = "meshsync", version, about = "Data Mesh Manager connector agent")]
struct Cli {
    /// Base URL of the Data Mesh Manager API.
    #[arg(long, env = "MESHSYNC_HOST")]
    host: String,

    #[arg(long, env = "MESHSYNC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "MESHSYNC_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register and poll the event feed, logging every event until Ctrl-C.
    Listen {
        #[arg(long, env = "MESHSYNC_CONNECTOR_ID")]
        connector_id: String,

        #[arg(long, default_value = "event-listener")]
        connector_type: String,

        /// Keep the cursor in memory instead of the connector state.
        #[arg(long)]
        memory_cursor: bool,
    },

    /// Create the connector record if needed and mark it UP.
    Register {
        #[arg(long, env = "MESHSYNC_CONNECTOR_ID")]
        connector_id: String,

        #[arg(long, default_value = "event-listener")]
        connector_type: String,
    },

    /// Print the connector record as JSON.
    Status {
        #[arg(long, env = "MESHSYNC_CONNECTOR_ID")]
        connector_id: String,
    },

    /// Clear the connector state (including the event cursor) and mark it UP.
    Reset {
        #[arg(long, env = "MESHSYNC_CONNECTOR_ID")]
        connector_id: String,
    },

    /// Delete the connector record.
    Delete {
        #[arg(long, env = "MESHSYNC_CONNECTOR_ID")]
        connector_id: String,
    },
}

/// Logs every event it receives.
struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn on_event(&self, event: &CloudEvent) -> anyhow::Result<()> {
        tracing::info!(event_id = %event.id, event_type = %event.event_type, "event received");
        Ok(())
    }

    async fn on_access_activated(&self, event: &AccessEvent) -> anyhow::Result<()> {
        tracing::info!(
            access_id = %event.id,
            data_product_id = ?event.data_product_id,
            consumer_team_id = ?event.consumer_team_id,
            "access activated"
        );
        Ok(())
    }

    async fn on_access_deactivated(&self, event: &AccessEvent) -> anyhow::Result<()> {
        tracing::info!(access_id = %event.id, "access deactivated");
        Ok(())
    }
}

/// Registration handle for a connector that may already exist, keeping its
/// recorded type.
async fn existing_registration(
    client: &Arc<MeshClient>,
    connector_id: String,
) -> anyhow::Result<ConnectorRegistration> {
    let connector_type = match client.connectors().get(&connector_id).await {
        Ok(c) if !c.info.connector_type.trim().is_empty() => c.info.connector_type,
        Ok(_) => "unknown".to_string(),
        Err(e) if e.is_not_found() => "unknown".to_string(),
        Err(e) => return Err(e.into()),
    };
    Ok(ConnectorRegistration::new(
        client.clone(),
        connector_id,
        connector_type,
    )?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meshsync_core::o11y::init_global_from_env()?;
    let cli = Cli::parse();

    let mut config = ClientConfig::new(cli.host);
    config.api_key = cli.api_key;
    config.timeout = Duration::from_secs(cli.timeout_secs);
    let client = Arc::new(MeshClient::new(&config)?);

    match cli.cmd {
        Command::Listen {
            connector_id,
            connector_type,
            memory_cursor,
        } => {
            let registration =
                ConnectorRegistration::new(client.clone(), connector_id, connector_type)?;
            let cursor_store: Arc<dyn CursorStore> = if memory_cursor {
                Arc::new(MemoryCursorStore::new())
            } else {
                Arc::new(RemoteCursorStore::new(client.clone()))
            };
            let listener = EventListener::connect(
                registration,
                client.clone(),
                Arc::new(LoggingEventHandler),
                cursor_store,
            )
            .await?
            .with_config(ListenerConfig::from_env()?)?;
            let listener = Arc::new(listener);

            let on_signal = listener.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => on_signal.stop(),
                    Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
                }
            });

            listener.start().await;
        }
        Command::Register {
            connector_id,
            connector_type,
        } => {
            ConnectorRegistration::new(client, connector_id, connector_type)?
                .register()
                .await?;
        }
        Command::Status { connector_id } => {
            let connector = client.connectors().get(&connector_id).await?;
            println!("{}", serde_json::to_string_pretty(&connector)?);
        }
        Command::Reset { connector_id } => {
            existing_registration(&client, connector_id)
                .await?
                .reset()
                .await?;
        }
        Command::Delete { connector_id } => {
            existing_registration(&client, connector_id)
                .await?
                .delete()
                .await?;
        }
    }

    Ok(())
}
