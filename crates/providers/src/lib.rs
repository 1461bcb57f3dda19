//! Brandmark Providers
//!
//! Connectors that answer "is this name taken here?" for external platforms,
//! and the registry grouping them into provider groups.

pub mod client_cache;
pub mod http_probe;
pub mod registry;
pub mod static_connector;

pub use brandmark_types::{ConnectorError, ConnectorResult, ProviderConnector};
pub use client_cache::{ClientCache, ClientConfig};
pub use http_probe::HttpProbeConnector;
pub use registry::{ProviderRegistry, RegistryError};
pub use static_connector::StaticConnector;
