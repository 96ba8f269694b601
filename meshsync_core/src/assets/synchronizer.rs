use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::traits::{AssetCallback, AssetStore, AssetsProvider};
use crate::connectors::{ConnectorRegistration, ConnectorStore};
use crate::models::Asset;
use crate::{Error, Result, duration_millis};

pub const ASSETS_SYNCHRONIZER_TYPE: &str = "assets-synchronizer";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Wait between two synchronization rounds.
    pub interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }
}

impl SyncConfig {
    /// Reads `MESHSYNC_SYNC_INTERVAL_SECS` (default one hour).
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("MESHSYNC_SYNC_INTERVAL_SECS") {
            let secs = v.trim().parse::<u64>().map_err(|_| {
                Error::InvalidInput("MESHSYNC_SYNC_INTERVAL_SECS must be a number".to_string())
            })?;
            cfg.interval = Duration::from_secs(secs);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    #[tracing::instrument(level = "debug")]
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidInput("sync interval must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Periodically pulls assets from an [`AssetsProvider`] and mirrors them into
/// the remote asset store, uploading only what changed.
pub struct AssetsSynchronizer {
    registration: ConnectorRegistration,
    assets: Arc<dyn AssetStore>,
    provider: Arc<dyn AssetsProvider>,
    interval_ms: AtomicU64,
    cancel: CancellationToken,
}

impl AssetsSynchronizer {
    /// Register as an `assets-synchronizer` connector and build the
    /// synchronizer. Registration failures abort startup.
    #[tracing::instrument(level = "info", skip(connectors, assets, provider, config))]
    pub async fn connect(
        connector_id: &str,
        connectors: Arc<dyn ConnectorStore>,
        assets: Arc<dyn AssetStore>,
        provider: Arc<dyn AssetsProvider>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;
        let registration =
            ConnectorRegistration::new(connectors, connector_id, ASSETS_SYNCHRONIZER_TYPE)?;
        registration.register().await?;
        Ok(Self {
            registration,
            assets,
            provider,
            interval_ms: AtomicU64::new(duration_millis(config.interval)),
            cancel: CancellationToken::new(),
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }

    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms
            .store(duration_millis(interval).max(1), Ordering::Relaxed);
    }

    /// Run synchronization rounds until `stop()` is called. A failed round is
    /// logged and the next one runs on schedule.
    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.registration.connector_id()))]
    pub async fn start(&self) {
        tracing::info!("start syncing assets");
        while !self.cancel.is_cancelled() {
            if let Err(e) = self.synchronize_assets().await {
                tracing::error!(error = %e, "asset synchronization round failed");
            }

            let wait = self.interval();
            tracing::info!(wait_secs = wait.as_secs(), "waiting until next sync");
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        if let Err(e) = self.registration.stop().await {
            tracing::warn!(error = %e, "failed to publish STOPPED health");
        }
        tracing::info!("stopped syncing assets");
    }

    #[tracing::instrument(level = "info", skip(self), fields(connector_id = %self.registration.connector_id()))]
    pub fn stop(&self) {
        if self.cancel.is_cancelled() {
            tracing::info!("asset synchronization already stopped");
            return;
        }
        self.cancel.cancel();
        tracing::info!("stopping asset synchronization");
    }

    /// One round: ask the provider for its assets and mirror each report.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn synchronize_assets(&self) -> Result<()> {
        self.provider.fetch_assets(&SyncCallback { sync: self }).await
    }

    /// Upload `asset` unless the remote copy is already identical. Returns
    /// whether an upload happened.
    #[tracing::instrument(level = "debug", skip(self, asset), fields(asset_id = %asset.id))]
    pub async fn save_asset(&self, asset: &Asset) -> Result<bool> {
        match self.assets.get_asset(&asset.id).await {
            Ok(existing) if existing == *asset => {
                tracing::info!("asset already exists and is unchanged");
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => tracing::debug!("asset does not exist yet"),
            Err(e) => return Err(e),
        }

        tracing::info!("saving asset");
        self.assets.put_asset(&asset.id, asset).await?;
        Ok(true)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete_asset(&self, id: &str) -> Result<()> {
        tracing::info!("deleting asset");
        self.assets.delete_asset(id).await
    }
}

struct SyncCallback<'a> {
    sync: &'a AssetsSynchronizer,
}

#[async_trait]
impl AssetCallback for SyncCallback<'_> {
    async fn on_asset_updated(&self, asset: Asset) -> Result<()> {
        self.sync.save_asset(&asset).await.map(|_| ())
    }

    async fn on_asset_deleted(&self, id: &str) -> Result<()> {
        self.sync.delete_asset(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::models::{AssetInfo, HealthStatus};
    use std::sync::Mutex;
    use tokio::time::sleep;

    fn table(id: &str, description: &str) -> Asset {
        Asset {
            id: id.to_string(),
            info: AssetInfo {
                source: "snowflake".to_string(),
                asset_type: "snowflake_table".to_string(),
                name: id.to_string(),
                description: Some(description.to_string()),
                ..AssetInfo::default()
            },
            ..Asset::default()
        }
    }

    /// Reports a fixed catalog; each round pops the next scripted list.
    #[derive(Default)]
    struct CatalogProvider {
        updated: Mutex<Vec<Asset>>,
        deleted: Mutex<Vec<String>>,
        rounds: Mutex<usize>,
    }

    #[async_trait]
    impl AssetsProvider for CatalogProvider {
        async fn fetch_assets(&self, callback: &dyn AssetCallback) -> Result<()> {
            *self.rounds.lock().unwrap() += 1;
            let updated = self.updated.lock().unwrap().clone();
            let deleted = self.deleted.lock().unwrap().clone();
            for asset in updated {
                callback.on_asset_updated(asset).await?;
            }
            for id in deleted {
                callback.on_asset_deleted(&id).await?;
            }
            Ok(())
        }
    }

    async fn synchronizer(
        backend: &Arc<MemoryBackend>,
        provider: &Arc<CatalogProvider>,
    ) -> AssetsSynchronizer {
        AssetsSynchronizer::connect(
            "assets-1",
            backend.clone(),
            backend.clone(),
            provider.clone(),
            SyncConfig::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn connect_registers_as_assets_synchronizer() {
        let backend = Arc::new(MemoryBackend::new());
        let provider = Arc::new(CatalogProvider::default());
        let _sync = synchronizer(&backend, &provider).await;

        let record = backend.get_connector("assets-1").await.unwrap();
        assert_eq!(record.info.connector_type, ASSETS_SYNCHRONIZER_TYPE);
    }

    #[tokio::test]
    async fn unchanged_assets_are_not_uploaded_again() {
        let backend = Arc::new(MemoryBackend::new());
        let provider = Arc::new(CatalogProvider::default());
        let sync = synchronizer(&backend, &provider).await;

        assert!(sync.save_asset(&table("orders", "v1")).await.unwrap());
        assert!(!sync.save_asset(&table("orders", "v1")).await.unwrap());
        assert!(sync.save_asset(&table("orders", "v2")).await.unwrap());

        assert_eq!(backend.asset_writes(), 2);
        let stored = backend.get_asset("orders").await.unwrap();
        assert_eq!(stored.info.description.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn a_round_mirrors_updates_and_deletes() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put_asset("legacy", &table("legacy", "old")).await.unwrap();
        let provider = Arc::new(CatalogProvider::default());
        *provider.updated.lock().unwrap() = vec![table("orders", "v1"), table("customers", "v1")];
        *provider.deleted.lock().unwrap() = vec!["legacy".to_string()];
        let sync = synchronizer(&backend, &provider).await;

        sync.synchronize_assets().await.unwrap();

        let mut ids: Vec<_> = backend.assets().into_iter().map(|a| a.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["customers".to_string(), "orders".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn rounds_repeat_on_the_interval_until_stopped() {
        let backend = Arc::new(MemoryBackend::new());
        let provider = Arc::new(CatalogProvider::default());
        // The first round fails on the delete of an unknown asset; the loop
        // keeps going.
        *provider.deleted.lock().unwrap() = vec!["missing".to_string()];
        let sync = Arc::new(synchronizer(&backend, &provider).await);
        sync.set_interval(Duration::from_secs(10));

        let running = sync.clone();
        let task = tokio::spawn(async move { running.start().await });

        sleep(Duration::from_secs(25)).await;
        assert_eq!(*provider.rounds.lock().unwrap(), 3);

        sync.stop();
        sync.stop();
        task.await.unwrap();

        let health = backend.get_connector("assets-1").await.unwrap().health.unwrap();
        assert_eq!(health.status, Some(HealthStatus::Stopped));
    }

    #[tokio::test]
    async fn set_interval_saturates_and_clamps() {
        let backend = Arc::new(MemoryBackend::new());
        let provider = Arc::new(CatalogProvider::default());
        let sync = synchronizer(&backend, &provider).await;

        sync.set_interval(Duration::MAX);
        assert_eq!(sync.interval(), Duration::from_millis(u64::MAX));

        sync.set_interval(Duration::ZERO);
        assert_eq!(sync.interval(), Duration::from_millis(1));
    }

    #[test]
    fn default_interval_is_an_hour() {
        assert_eq!(SyncConfig::default().interval, Duration::from_secs(3600));
        assert!(
            SyncConfig {
                interval: Duration::ZERO
            }
            .validate()
            .is_err()
        );
    }
}
