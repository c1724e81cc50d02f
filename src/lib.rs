pub mod binding;
mod builder;
mod cache_proxy;
mod client;
pub mod coerce;
mod config;
mod overrides;
pub mod registry;
mod resolved;
pub mod resolver;
pub mod sections;
#[cfg(feature = "server")]
pub mod server;
pub mod source;
pub mod transport;
mod worker;

#[cfg(test)]
mod test;

pub use builder::Builder;
pub use client::FlagClient;
pub use config::{ConfigError, ServerConfig};
pub use registry::{Category, FeatureDescriptor, Registry};
pub use resolved::ResolvedFlagSet;
pub use resolver::FlagResolver;
pub use worker::Worker;

/// The client's view of the endpoint body: key to enabled.
pub type FlagMap = std::collections::HashMap<String, bool>;
