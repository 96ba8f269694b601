use std::error::Error as StdError;

/// Common error type for `meshsync_core`.
///
/// Remote collaborators (HTTP clients, in-memory backends) map their failures
/// onto `NotFound` or `Transport`; the listener decides retry behaviour from
/// the variant alone.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport error: {context}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("failed to decode event {event_id} of type {event_type}")]
    Decode {
        event_id: String,
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("handler failed for event {event_id} of type {event_type}: {source}")]
    Handler {
        event_id: String,
        event_type: String,
        source: anyhow::Error,
    },

    #[error("backend error: {context}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("backend error: {0}")]
    BackendMessage(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    #[tracing::instrument(level = "debug", name = "meshsync.error.transport", skip(source))]
    pub fn transport(
        context: impl Into<String> + std::fmt::Debug,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[tracing::instrument(level = "debug", name = "meshsync.error.backend", skip(source))]
    pub fn backend(
        context: impl Into<String> + std::fmt::Debug,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for the benign "resource does not exist" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
