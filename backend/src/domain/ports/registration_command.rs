//! Driving port for user registration.
//!
//! Inbound adapters hand a decoded [`RegistrationInput`] to
//! [`RegistrationCommand::register`] and receive either the stored record or a
//! transport-agnostic [`Error`].

use async_trait::async_trait;

use crate::domain::{
    Error, FieldValue, HashedPassword, Registration, RegistrationInput, Salt, UserRecord,
};

/// Driving port for registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Validate, hash and store a new user.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_request` error naming the offending field when
    /// validation fails and an `internal_error` when hashing or storage fails.
    async fn register(&self, input: RegistrationInput) -> Result<Registration, Error>;
}

/// Fixture implementation for handler tests that do not need real hashing.
///
/// Echoes the required fields back with a fixed salt and digest and never
/// validates.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistrationCommand;

const FIXTURE_SALT: &str = "$2b$10$00000000000000000000000000000000";

#[async_trait]
impl RegistrationCommand for FixtureRegistrationCommand {
    async fn register(&self, input: RegistrationInput) -> Result<Registration, Error> {
        let required = input
            .required()
            .ok_or_else(|| Error::invalid_request("fixture requires username, email, and password"))?;
        let salt = Salt::parse(FIXTURE_SALT)
            .map_err(|err| Error::internal(format!("fixture salt rejected: {err}")))?;
        let hash = HashedPassword::derive("fixture", &salt);
        let additional: Vec<(String, FieldValue)> = input
            .additional()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect();
        Ok(Registration::new(UserRecord::new(
            required, salt, hash, additional,
        )))
    }
}
