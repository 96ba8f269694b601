mod synchronizer;
pub mod traits;

pub use synchronizer::{ASSETS_SYNCHRONIZER_TYPE, AssetsSynchronizer, SyncConfig};
pub use traits::{AssetCallback, AssetStore, AssetsProvider};
