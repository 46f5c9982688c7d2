//! Registration payloads and the user record handed to storage.
//!
//! Purpose: hold submitted fields in their submission order, expose the
//! required/additional split the validator works on, and describe the record
//! and success payload produced once a registration goes through.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::credentials::{HashedPassword, Salt, StoredCredential};

/// Field carrying the account name.
pub const USERNAME_FIELD: &str = "username";
/// Field carrying the contact address.
pub const EMAIL_FIELD: &str = "email";
/// Field carrying the plaintext password.
pub const PASSWORD_FIELD: &str = "password";
/// Record key holding the password salt; never accepted from clients.
pub const PASSWORD_SALT_FIELD: &str = "passwordSalt";
/// Required fields in validation order.
pub const REQUIRED_FIELDS: [&str; 3] = [USERNAME_FIELD, EMAIL_FIELD, PASSWORD_FIELD];

/// Message returned with every successful registration.
pub const REGISTRATION_SUCCESS_MESSAGE: &str = "Registration successful";

/// Raw value submitted for one field.
///
/// JSON bodies may carry any JSON value; form bodies only produce strings.
///
/// # Examples
/// ```
/// use backend::domain::FieldValue;
///
/// assert_eq!(FieldValue::from(25).to_text().as_deref(), Some("25"));
/// assert!(FieldValue::from("").is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldValue(Value);

impl FieldValue {
    /// The value when it was submitted as a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Text rendering of scalar values.
    ///
    /// Strings are borrowed; numbers and booleans are rendered. Null, arrays
    /// and objects have no text form.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match &self.0 {
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            Value::Number(number) => Some(Cow::Owned(number.to_string())),
            Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Whether the value counts as not supplied: null, `""`, `false` or `0`.
    pub fn is_blank(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            Value::Bool(flag) => !flag,
            Value::Number(number) => number.as_f64() == Some(0.0),
            Value::Array(_) | Value::Object(_) => false,
        }
    }

    /// Underlying JSON value.
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}", self.0),
        }
    }
}

impl PartialEq<str> for FieldValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        value.0
    }
}

/// Fields submitted to the registration endpoint, in submission order.
///
/// Re-submitting a name replaces its value but keeps its original position,
/// matching how an ordered JSON object treats duplicate keys. Lookups go
/// through a name index so decoding stays linear in the field count.
///
/// # Examples
/// ```
/// use backend::domain::RegistrationInput;
///
/// let input = RegistrationInput::from_pairs([
///     ("username", "alice1234"),
///     ("email", "a@b.com"),
///     ("password", "Abcdef1!"),
///     ("age", "25"),
/// ]);
/// let extra: Vec<&str> = input.additional().map(|(name, _)| name).collect();
/// assert_eq!(extra, ["age"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationInput {
    fields: Vec<(String, FieldValue)>,
    positions: HashMap<String, usize>,
}

/// Borrowed view of the three required fields.
#[derive(Debug, Clone, Copy)]
pub struct RequiredFields<'a> {
    pub username: &'a FieldValue,
    pub email: &'a FieldValue,
    pub password: &'a FieldValue,
}

impl RegistrationInput {
    /// Build an input from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let pairs = pairs.into_iter();
        let mut input = Self::with_capacity(pairs.size_hint().0);
        for (name, value) in pairs {
            input.insert(name.into(), value.into());
        }
        input
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, name: String, value: FieldValue) {
        match self.positions.entry(name) {
            Entry::Occupied(position) => {
                if let Some((_, slot)) = self.fields.get_mut(*position.get()) {
                    *slot = value;
                }
            }
            Entry::Vacant(position) => {
                self.fields.push((position.key().clone(), value));
                position.insert(self.fields.len() - 1);
            }
        }
    }

    /// Look a field up by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.positions
            .get(name)
            .and_then(|&position| self.fields.get(position))
            .map(|(_, value)| value)
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was submitted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of required fields that are absent or blank, in validation order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|name| self.get(name).is_none_or(FieldValue::is_blank))
            .collect()
    }

    /// The required fields, when all three are present and non-blank.
    pub fn required(&self) -> Option<RequiredFields<'_>> {
        let present = |name: &'static str| self.get(name).filter(|value| !value.is_blank());
        Some(RequiredFields {
            username: present(USERNAME_FIELD)?,
            email: present(EMAIL_FIELD)?,
            password: present(PASSWORD_FIELD)?,
        })
    }

    /// Every field other than the required ones, in submission order.
    pub fn additional(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .filter(|(name, _)| !REQUIRED_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl From<Map<String, Value>> for RegistrationInput {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_pairs(map)
    }
}

/// Snapshot of a registered user handed to the store.
///
/// `username` and `email` keep the value exactly as submitted, so a numeric
/// JSON username stays a number. `password` holds the PBKDF2 digest, never
/// the submitted plaintext. The salt
/// is kept alongside it under `passwordSalt`; [`UserRecord::credential`]
/// rebuilds the `<salt>$<hash>` layout accepted by
/// [`compare_password`](crate::domain::compare_password).
///
/// Serialising a record exposes the digest and salt. Adapters returning it to
/// untrusted clients should strip both.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    username: FieldValue,
    email: FieldValue,
    password: HashedPassword,
    password_salt: Salt,
    additional: Vec<(String, FieldValue)>,
}

impl UserRecord {
    pub(crate) fn new(
        required: RequiredFields<'_>,
        salt: Salt,
        hash: HashedPassword,
        additional: Vec<(String, FieldValue)>,
    ) -> Self {
        Self {
            username: required.username.clone(),
            email: required.email.clone(),
            password: hash,
            password_salt: salt,
            additional,
        }
    }

    /// Account name as submitted.
    pub fn username(&self) -> &FieldValue {
        &self.username
    }

    /// Contact address as submitted.
    pub fn email(&self) -> &FieldValue {
        &self.email
    }

    /// Password digest.
    pub fn password(&self) -> &HashedPassword {
        &self.password
    }

    /// Salt the digest was derived with.
    pub fn password_salt(&self) -> &Salt {
        &self.password_salt
    }

    /// Optional fields in submission order.
    pub fn additional(&self) -> &[(String, FieldValue)] {
        &self.additional
    }

    /// Salt and digest joined for [`compare_password`](crate::domain::compare_password).
    pub fn credential(&self) -> StoredCredential {
        StoredCredential::new(self.password_salt.clone(), self.password.clone())
    }
}

impl Serialize for UserRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = Map::new();
        map.insert(USERNAME_FIELD.to_owned(), self.username.as_json().clone());
        map.insert(EMAIL_FIELD.to_owned(), self.email.as_json().clone());
        map.insert(PASSWORD_FIELD.to_owned(), Value::from(self.password.as_str()));
        map.insert(
            PASSWORD_SALT_FIELD.to_owned(),
            Value::from(self.password_salt.as_str()),
        );
        for (name, value) in &self.additional {
            map.insert(name.clone(), value.as_json().clone());
        }
        map.serialize(serializer)
    }
}

/// Payload returned after the record is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    /// Always [`REGISTRATION_SUCCESS_MESSAGE`].
    pub message: String,
    /// The stored record, digest included.
    pub user: UserRecord,
}

impl Registration {
    pub(crate) fn new(user: UserRecord) -> Self {
        Self {
            message: REGISTRATION_SUCCESS_MESSAGE.to_owned(),
            user,
        }
    }
}
