//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use backend::config::{RegistrationSettings, SettingsError};
use backend::domain::{CredentialHasher, RegistrationValidator};

/// Resolved configuration for creating the HTTP server.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) hasher: CredentialHasher,
    pub(crate) validator: RegistrationValidator,
}

impl ServerConfig {
    /// Construct a server configuration from explicit parts.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        hasher: CredentialHasher,
        validator: RegistrationValidator,
    ) -> Self {
        Self {
            bind_addr,
            hasher,
            validator,
        }
    }

    /// Resolve loaded settings into a server configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for an unparseable address or zero salt
    /// rounds.
    pub fn from_settings(settings: &RegistrationSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(
            settings.bind_addr()?,
            settings.hasher()?,
            settings.validator(),
        ))
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
