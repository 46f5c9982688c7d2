//! Registration domain service.
//!
//! Orchestrates the registration pipeline: required-field presence, field
//! validation, salt and hash derivation, then storage. Validation failures
//! return before any hashing or storage work starts.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{RegistrationCommand, UserStore, UserStoreError};
use crate::domain::{
    CredentialHasher, Error, FieldRejection, FieldValue, HashingError, Registration,
    RegistrationInput, RegistrationValidator, UserRecord,
};

/// Client-facing message when a required field is absent or blank.
pub const MISSING_FIELDS_MESSAGE: &str = "Username, email, and password are required fields.";

/// Message returned in place of any internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Why a registration attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// One or more of username, email and password is absent or blank.
    #[error("Username, email, and password are required fields.")]
    MissingField {
        /// Missing names in validation order.
        fields: Vec<String>,
    },
    /// A field failed its validator.
    #[error("{reason}")]
    InvalidField { field: String, reason: String },
    /// The store refused the record.
    #[error(transparent)]
    Storage(#[from] UserStoreError),
    /// Anything else, such as a failed hashing task.
    #[error("unexpected registration failure: {message}")]
    Unexpected { message: String },
}

impl From<FieldRejection> for RegistrationError {
    fn from(rejection: FieldRejection) -> Self {
        Self::InvalidField {
            field: rejection.field,
            reason: rejection.reason,
        }
    }
}

impl From<HashingError> for RegistrationError {
    fn from(err: HashingError) -> Self {
        Self::Unexpected {
            message: err.to_string(),
        }
    }
}

impl From<RegistrationError> for Error {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::MissingField { fields } => {
                Error::invalid_request(MISSING_FIELDS_MESSAGE).with_details(json!({
                    "field": fields.first(),
                    "fields": fields,
                    "code": "missing_field",
                }))
            }
            RegistrationError::InvalidField { field, reason } => Error::invalid_request(reason)
                .with_details(json!({
                    "field": field,
                    "code": "invalid_field",
                })),
            RegistrationError::Storage(_) | RegistrationError::Unexpected { .. } => {
                Error::internal(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

/// Registration service implementing [`RegistrationCommand`].
#[derive(Clone)]
pub struct RegistrationService<S> {
    store: Arc<S>,
    hasher: CredentialHasher,
    validator: RegistrationValidator,
}

impl<S> RegistrationService<S> {
    /// Create a service over `store` with default hashing and validation.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_parts(
            store,
            CredentialHasher::default(),
            RegistrationValidator::default(),
        )
    }

    /// Create a service with an explicit hasher and validator.
    pub fn with_parts(
        store: Arc<S>,
        hasher: CredentialHasher,
        validator: RegistrationValidator,
    ) -> Self {
        Self {
            store,
            hasher,
            validator,
        }
    }

    /// The configured hasher.
    pub fn hasher(&self) -> CredentialHasher {
        self.hasher
    }
}

impl<S> RegistrationService<S>
where
    S: UserStore,
{
    /// Validate, hash and store a new user.
    ///
    /// # Errors
    ///
    /// See [`RegistrationError`]. Only `Storage` and `Unexpected` can occur
    /// after hashing has started.
    pub async fn register(
        &self,
        input: RegistrationInput,
    ) -> Result<Registration, RegistrationError> {
        let Some(required) = input.required() else {
            return Err(RegistrationError::MissingField {
                fields: input
                    .missing_required()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            });
        };

        self.validator.validate_required(&input).into_result()?;
        self.validator
            .validate_additional(input.additional())
            .into_result()?;

        let password = required
            .password
            .to_text()
            .ok_or_else(|| RegistrationError::Unexpected {
                message: "validated password has no text form".to_owned(),
            })?;
        let (salt, hash) = self.hasher.derive(&password).await?;

        let additional: Vec<(String, FieldValue)> = input
            .additional()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect();
        let record = UserRecord::new(required, salt, hash, additional);

        self.store.save(record.clone()).await?;
        info!(username = %record.username(), "user registered");
        Ok(Registration::new(record))
    }
}

#[async_trait]
impl<S> RegistrationCommand for RegistrationService<S>
where
    S: UserStore,
{
    async fn register(&self, input: RegistrationInput) -> Result<Registration, Error> {
        RegistrationService::register(self, input)
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    RegistrationError::Storage(_) | RegistrationError::Unexpected { .. }
                ) {
                    error!(error = %err, "registration failed");
                }
                Error::from(err)
            })
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
