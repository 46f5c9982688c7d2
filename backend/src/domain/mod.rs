//! Domain primitives, services and ports.
//!
//! Purpose: hold everything registration needs independent of transport and
//! storage. Adapters talk to this layer through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - RegistrationInput / UserRecord / Registration: request and result types.
//! - RegistrationValidator: fail-fast field validation.
//! - CredentialHasher: salt and hash derivation in blocking or suspending mode.
//! - RegistrationService: the registration pipeline behind
//!   [`ports::RegistrationCommand`].

pub mod credentials;
pub mod error;
pub mod field_validators;
pub mod ports;
pub mod registration;
pub mod registration_service;
pub mod registration_validator;

pub use self::credentials::{
    CredentialFormatError, CredentialHasher, DEFAULT_SALT_ROUNDS, HASH_ITERATIONS, HashedPassword,
    HashingError, HashingMode, SALT_VERSION, Salt, StoredCredential, compare_password,
    compare_password_async, generate_salt, generate_salt_async, hash_password,
    hash_password_async,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::registration::{
    EMAIL_FIELD, FieldValue, PASSWORD_FIELD, PASSWORD_SALT_FIELD, REGISTRATION_SUCCESS_MESSAGE,
    REQUIRED_FIELDS, Registration, RegistrationInput, RequiredFields, USERNAME_FIELD, UserRecord,
};
pub use self::registration_service::{
    INTERNAL_ERROR_MESSAGE, MISSING_FIELDS_MESSAGE, RegistrationError, RegistrationService,
};
pub use self::registration_validator::{
    FieldCheck, FieldRejection, FieldRule, RegistrationValidator, UnknownFieldPolicy,
    ValidationOutcome,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::invalid_request("Invalid age."))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
