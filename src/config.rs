use std::net::SocketAddr;

pub(crate) const LISTEN_VAR: &str = "ELEVATE_FLAGS_LISTEN";
const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid listen address `{0}` in ELEVATE_FLAGS_LISTEN: {1}")]
    Listen(String, #[source] std::net::AddrParseError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen = lookup(LISTEN_VAR).unwrap_or_else(|| DEFAULT_LISTEN.into());

        let listen = listen
            .trim()
            .parse()
            .map_err(|e| ConfigError::Listen(listen.clone(), e))?;

        Ok(Self { listen })
    }
}
