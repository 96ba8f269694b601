#![forbid(unsafe_code)]

mod apis;
mod backend;
mod client;
mod config;
mod error;

pub use apis::*;
pub use client::MeshClient;
pub use config::ClientConfig;
pub use error::{MeshError, MeshErrorKind};
