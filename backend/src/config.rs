//! Service configuration loaded via OrthoConfig.
//!
//! Values layer as CLI flags over `REGISTRATION_*` environment variables over
//! the configuration file over the defaults below.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    CredentialHasher, DEFAULT_SALT_ROUNDS, HashingMode, RegistrationValidator, UnknownFieldPolicy,
};

/// Listener address used when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// A configured value could not be turned into a usable setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
    /// `salt_rounds` was set to zero.
    #[error("salt rounds must be at least 1")]
    ZeroSaltRounds,
}

/// Settings controlling the registration service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
pub struct RegistrationSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// Move salt and hash work onto the blocking thread pool.
    #[ortho_config(default = false)]
    pub suspending_hashing: bool,
    /// Cost factor embedded in generated salts.
    pub salt_rounds: Option<u32>,
    /// Refuse additional fields that have no validator.
    #[ortho_config(default = false)]
    pub reject_unknown_fields: bool,
}

impl RegistrationSettings {
    /// The listener address, falling back to [`DEFAULT_BIND_ADDR`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not
    /// parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            })
    }

    /// Salt rounds, falling back to [`DEFAULT_SALT_ROUNDS`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroSaltRounds`] for a configured zero.
    pub fn salt_rounds(&self) -> Result<u32, SettingsError> {
        match self.salt_rounds {
            Some(0) => Err(SettingsError::ZeroSaltRounds),
            Some(rounds) => Ok(rounds),
            None => Ok(DEFAULT_SALT_ROUNDS),
        }
    }

    pub fn hashing_mode(&self) -> HashingMode {
        if self.suspending_hashing {
            HashingMode::Suspending
        } else {
            HashingMode::Blocking
        }
    }

    pub fn unknown_field_policy(&self) -> UnknownFieldPolicy {
        if self.reject_unknown_fields {
            UnknownFieldPolicy::Reject
        } else {
            UnknownFieldPolicy::Accept
        }
    }

    /// Hasher built from the configured mode and rounds.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::salt_rounds`] failures.
    pub fn hasher(&self) -> Result<CredentialHasher, SettingsError> {
        Ok(CredentialHasher::new(self.hashing_mode(), self.salt_rounds()?))
    }

    pub fn validator(&self) -> RegistrationValidator {
        RegistrationValidator::new(self.unknown_field_policy())
    }
}
