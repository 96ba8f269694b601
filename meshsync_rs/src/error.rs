use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshErrorKind {
    NotFound,
    Auth,
    Validation,
    Server,
    Transport,
    Serialization,
    Config,
}

/// Failure of a call against the Data Mesh Manager REST API.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct MeshError {
    pub kind: MeshErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl MeshError {
    pub fn new(kind: MeshErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == MeshErrorKind::NotFound
    }
}

impl From<reqwest::Error> for MeshError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_decode() {
            MeshErrorKind::Serialization
        } else {
            MeshErrorKind::Transport
        };
        MeshError::new(kind, e.status().map(|s| s.as_u16()), e.to_string())
    }
}

impl From<serde_json::Error> for MeshError {
    fn from(e: serde_json::Error) -> Self {
        MeshError::new(MeshErrorKind::Serialization, None, e.to_string())
    }
}

/// 404 becomes `NotFound`, which the listener and registration treat as
/// benign; everything else is a retryable transport failure.
impl From<MeshError> for meshsync_core::Error {
    fn from(e: MeshError) -> Self {
        if e.is_not_found() {
            return meshsync_core::Error::NotFound(e.message);
        }
        let context = match e.status {
            Some(status) => format!("data mesh manager returned {status}"),
            None => "data mesh manager request failed".to_string(),
        };
        meshsync_core::Error::transport(context, e)
    }
}
