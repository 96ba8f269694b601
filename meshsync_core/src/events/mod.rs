#![forbid(unsafe_code)]

pub mod config;
pub mod cursor;
pub mod decode;
pub mod handler;
pub mod listener;
pub mod models;
#[cfg(test)]
mod test_support;
pub mod traits;

pub use config::{EventFailurePolicy, ListenerConfig};
pub use cursor::{CursorStore, LAST_EVENT_ID_KEY, MemoryCursorStore, RemoteCursorStore};
pub use decode::{Decoded, decode};
pub use handler::{EventHandler, dispatch};
pub use listener::{EventListener, PollOutcome};
pub use models::{
    AccessEvent, CloudEvent, DomainEvent, EntityEvent, EventKind, OutputPortEvent,
    TestResultsEvent,
};
pub use traits::EventFeed;
