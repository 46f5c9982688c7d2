//! Fail-fast validation of registration input.
//!
//! Required fields are checked in a fixed order (username, email, password).
//! Additional fields are checked in submission order. Each additional field
//! name is resolved through two static tables: a field-specific table of
//! dedicated predicates, then a parameterised table pairing a generic
//! predicate with its bounds. Names found in neither table are governed by
//! [`UnknownFieldPolicy`].

use tracing::debug;

use crate::domain::field_validators::{
    self, ADDRESS_LENGTH, FIRSTNAME_LENGTH, LASTNAME_LENGTH, LengthRange,
};
use crate::domain::registration::{
    EMAIL_FIELD, FieldValue, PASSWORD_FIELD, PASSWORD_SALT_FIELD, RegistrationInput,
    USERNAME_FIELD,
};

/// Predicate applied to a single field value.
pub type FieldCheck = fn(&FieldValue) -> bool;

/// Why a field was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRejection {
    /// Name of the offending field.
    pub field: String,
    /// Client-facing reason, e.g. `Invalid age.`.
    pub reason: String,
}

impl FieldRejection {
    fn invalid(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            reason: format!("Invalid {field}."),
        }
    }
}

/// Result of one validation pass; stops at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Every inspected field passed.
    Valid,
    /// The first field that failed.
    Invalid(FieldRejection),
}

impl ValidationOutcome {
    /// Whether the pass succeeded.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Convert into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<(), FieldRejection> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(rejection) => Err(rejection),
        }
    }

    fn rejecting(field: &str) -> Self {
        Self::Invalid(FieldRejection::invalid(field))
    }
}

/// Treatment of additional fields that no table recognises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Accept the field without checking it.
    #[default]
    Accept,
    /// Refuse the field as invalid.
    Reject,
}

/// Validator resolved for one additional field.
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    /// A dedicated predicate.
    Check(FieldCheck),
    /// The generic length predicate with its bounds.
    Length(LengthRange),
}

impl FieldRule {
    /// Apply the rule to `value`.
    pub fn applies(self, value: &FieldValue) -> bool {
        match self {
            Self::Check(check) => check(value),
            Self::Length(range) => field_validators::length(value, range),
        }
    }
}

fn firstname(value: &FieldValue) -> bool {
    field_validators::length(value, FIRSTNAME_LENGTH)
}

fn lastname(value: &FieldValue) -> bool {
    field_validators::length(value, LASTNAME_LENGTH)
}

/// Dedicated predicates, consulted first.
fn field_specific(name: &str) -> Option<FieldCheck> {
    match name {
        "firstname" => Some(firstname),
        "lastname" => Some(lastname),
        "number" | "phoneNumber" => Some(field_validators::phone_number),
        "gender" => Some(field_validators::gender),
        "age" => Some(field_validators::age),
        _ => None,
    }
}

/// Generic predicates with parameters, consulted when no dedicated one exists.
fn parameterised(name: &str) -> Option<FieldRule> {
    match name {
        "firstname" => Some(FieldRule::Length(FIRSTNAME_LENGTH)),
        "lastname" => Some(FieldRule::Length(LASTNAME_LENGTH)),
        "address" => Some(FieldRule::Length(ADDRESS_LENGTH)),
        "number" | "phoneNumber" => Some(FieldRule::Check(field_validators::phone_number)),
        "gender" => Some(FieldRule::Check(field_validators::gender)),
        "age" => Some(FieldRule::Check(field_validators::age)),
        _ => None,
    }
}

/// Validates registration input, stopping at the first invalid field.
///
/// # Examples
/// ```
/// use backend::domain::{RegistrationInput, RegistrationValidator};
///
/// let input = RegistrationInput::from_pairs([
///     ("username", "alice1234"),
///     ("email", "a@b.com"),
///     ("password", "Abcdef1!"),
///     ("age", "17"),
/// ]);
/// let validator = RegistrationValidator::default();
/// assert!(validator.validate_required(&input).is_valid());
/// assert!(!validator.validate_additional(input.additional()).is_valid());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationValidator {
    unknown_fields: UnknownFieldPolicy,
}

impl RegistrationValidator {
    /// Build a validator with an explicit unknown-field policy.
    pub fn new(unknown_fields: UnknownFieldPolicy) -> Self {
        Self { unknown_fields }
    }

    /// Configured unknown-field policy.
    pub fn unknown_fields(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }

    /// Resolve the rule for an additional field name.
    pub fn resolve(name: &str) -> Option<FieldRule> {
        field_specific(name)
            .map(FieldRule::Check)
            .or_else(|| parameterised(name))
    }

    /// Check username, email and password, in that order.
    pub fn validate_required(&self, input: &RegistrationInput) -> ValidationOutcome {
        let checks: [(&str, FieldCheck); 3] = [
            (USERNAME_FIELD, field_validators::username),
            (EMAIL_FIELD, field_validators::email),
            (PASSWORD_FIELD, field_validators::password),
        ];
        for (name, check) in checks {
            if !input.get(name).is_some_and(check) {
                return ValidationOutcome::rejecting(name);
            }
        }
        ValidationOutcome::Valid
    }

    /// Check additional fields in the order given.
    pub fn validate_additional<'a, I>(&self, fields: I) -> ValidationOutcome
    where
        I: IntoIterator<Item = (&'a str, &'a FieldValue)>,
    {
        for (name, value) in fields {
            if name == PASSWORD_SALT_FIELD {
                return ValidationOutcome::rejecting(name);
            }
            match Self::resolve(name) {
                Some(rule) if rule.applies(value) => {}
                Some(_) => return ValidationOutcome::rejecting(name),
                None => match self.unknown_fields {
                    UnknownFieldPolicy::Accept => {
                        debug!(field = %name, "no validator registered; accepting field");
                    }
                    UnknownFieldPolicy::Reject => return ValidationOutcome::rejecting(name),
                },
            }
        }
        ValidationOutcome::Valid
    }

    /// Required fields first, then additional fields.
    pub fn validate(&self, input: &RegistrationInput) -> ValidationOutcome {
        match self.validate_required(input) {
            ValidationOutcome::Valid => self.validate_additional(input.additional()),
            invalid @ ValidationOutcome::Invalid(_) => invalid,
        }
    }
}
