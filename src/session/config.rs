//! Session configuration.

use std::net::{IpAddr, SocketAddr};

use crate::core::{ConfigError, constants::DEFAULT_PRIMARY_PORT};

/// Configuration for a [`SyncSession`].
///
/// The primary peer is addressed by an IP address string (it is trimmed
/// before parsing, so editor-pasted values with stray whitespace work)
/// and a port, defaulting to the deployment's well-known 46000.
///
/// [`SyncSession`]: crate::session::SyncSession
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Primary peer IP address, as configured.
    pub primary_address: String,

    /// Primary peer port.
    pub primary_port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { primary_address: "127.0.0.1".to_string(), primary_port: DEFAULT_PRIMARY_PORT }
    }
}

impl SessionConfig {
    /// Resolve the configured address and port into a socket address.
    ///
    /// Fails with [`ConfigError::InvalidAddress`] if the (trimmed)
    /// address is not a valid IP address.
    pub fn primary_endpoint(&self) -> Result<SocketAddr, ConfigError> {
        let trimmed = self.primary_address.trim();
        let ip: IpAddr = trimmed
            .parse()
            .map_err(|_| ConfigError::InvalidAddress { address: trimmed.to_string() })?;
        Ok(SocketAddr::new(ip, self.primary_port))
    }
}

/// Builder for creating a [`SessionConfig`].
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new config builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary peer address.
    pub fn primary_address(mut self, address: impl Into<String>) -> Self {
        self.config.primary_address = address.into();
        self
    }

    /// Set the primary peer port.
    pub fn primary_port(mut self, port: u16) -> Self {
        self.config.primary_port = port;
        self
    }

    /// Build the session configuration.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        let config = SessionConfig::default();
        assert_eq!(config.primary_port, 46000);
        assert_eq!(config.primary_endpoint().unwrap().port(), 46000);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfigBuilder::new()
            .primary_address("192.168.0.42")
            .primary_port(47001)
            .build();

        let endpoint = config.primary_endpoint().unwrap();
        assert_eq!(endpoint.to_string(), "192.168.0.42:47001");
    }

    #[test]
    fn test_address_is_trimmed() {
        let config = SessionConfigBuilder::new().primary_address("  10.0.0.1 \n").build();
        assert_eq!(config.primary_endpoint().unwrap().ip().to_string(), "10.0.0.1");
    }

    #[test]
    fn test_invalid_address() {
        let config = SessionConfigBuilder::new().primary_address("not-an-ip").build();
        assert_eq!(
            config.primary_endpoint(),
            Err(ConfigError::InvalidAddress { address: "not-an-ip".to_string() })
        );
    }
}
