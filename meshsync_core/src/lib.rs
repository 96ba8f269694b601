//! meshsync core library: the event listener, its collaborator traits and
//! shared models.

pub mod assets;
pub mod connectors;
pub mod error;
pub mod events;
pub mod memory;
pub mod models;
pub mod o11y;

pub use assets::{AssetCallback, AssetStore, AssetsProvider, AssetsSynchronizer, SyncConfig};
pub use connectors::{ConnectorRegistration, ConnectorStore};
pub use error::{Error, Result};
pub use events::{
    CloudEvent, CursorStore, DomainEvent, EventFailurePolicy, EventFeed, EventHandler,
    EventKind, EventListener, ListenerConfig, MemoryCursorStore, PollOutcome, RemoteCursorStore,
};
pub use memory::MemoryBackend;
pub use models::{Asset, AssetColumn, AssetInfo, Connector, ConnectorHealth, ConnectorInfo, HealthStatus};

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
