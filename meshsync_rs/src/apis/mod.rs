mod assets;
mod connectors;
mod events;

pub use assets::AssetsApi;
pub use connectors::ConnectorsApi;
pub use events::EventsApi;
