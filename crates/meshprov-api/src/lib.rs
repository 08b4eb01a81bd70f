// meshprov-api: Async client for the mobility controller REST API

pub mod auth;
pub mod client;
pub mod commands;
pub mod error;
pub mod models;
pub mod payload;
pub mod session;
pub mod transport;

pub use auth::{Credentials, Session};
pub use client::ControllerClient;
pub use error::Error;
pub use models::{ApProvisioning, CommandResponse, GlobalResult, MeshRole, ObjectEndpoint};
pub use transport::{TlsMode, TransportConfig};
