mod registration;
pub mod traits;

pub use registration::ConnectorRegistration;
pub use traits::ConnectorStore;
