//! Password salting, hashing and comparison.
//!
//! Salts use the `$2b$<rounds>$<32 hex chars>` layout and hashes are
//! PBKDF2-HMAC-SHA512 digests (10 000 iterations, 64 bytes) rendered as 128
//! lowercase hex characters. The whole salt string, prefix included, feeds the
//! key derivation.
//!
//! Every operation has a blocking form and a suspending form. The suspending
//! form moves the work onto Tokio's blocking pool; both produce identical
//! output for identical inputs. [`CredentialHasher`] selects between them
//! once, at construction time.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::RngCore;
use rand::rngs::OsRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Version tag embedded in generated salts.
pub const SALT_VERSION: &str = "2b";
/// Cost factor recorded in salts when none is configured.
pub const DEFAULT_SALT_ROUNDS: u32 = 10;
/// PBKDF2 iteration count.
pub const HASH_ITERATIONS: u32 = 10_000;

const SALT_RANDOM_BYTES: usize = 16;
const HASH_BYTES: usize = 64;

/// Errors raised when a salt, hash or stored credential does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialFormatError {
    /// Salt does not follow `$2b$<rounds>$<32 hex chars>`.
    #[error("salt must look like $2b$<rounds>$<32 hex characters>")]
    MalformedSalt,
    /// Hash is not 128 lowercase hex characters.
    #[error("password hash must be 128 lowercase hex characters")]
    MalformedHash,
    /// Stored credential lacks the `$` separating salt and hash.
    #[error("stored credential must join salt and hash with `$`")]
    MissingSeparator,
}

/// Errors raised while running hashing work on the blocking pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashingError {
    /// The blocking task panicked or was cancelled.
    #[error("hashing task failed: {message}")]
    TaskFailed { message: String },
}

impl From<tokio::task::JoinError> for HashingError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed {
            message: err.to_string(),
        }
    }
}

static SALT_RE: OnceLock<Regex> = OnceLock::new();
static HASH_RE: OnceLock<Regex> = OnceLock::new();

fn salt_regex() -> &'static Regex {
    SALT_RE.get_or_init(|| {
        Regex::new(r"^\$2b\$([0-9]{1,10})\$[0-9a-f]{32}$")
            .unwrap_or_else(|error| panic!("salt regex failed to compile: {error}"))
    })
}

fn hash_regex() -> &'static Regex {
    HASH_RE.get_or_init(|| {
        Regex::new("^[0-9a-f]{128}$")
            .unwrap_or_else(|error| panic!("hash regex failed to compile: {error}"))
    })
}

/// Per-credential random salt.
///
/// ## Invariants
/// - Matches `$2b$<rounds>$<32 lowercase hex chars>`.
///
/// # Examples
/// ```
/// use backend::domain::Salt;
///
/// let salt = Salt::generate(10);
/// assert!(salt.as_str().starts_with("$2b$10$"));
/// assert_eq!(salt.rounds(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Salt {
    raw: String,
    rounds: u32,
}

impl Salt {
    /// Draw 16 bytes from the operating system RNG and build a salt.
    pub fn generate(rounds: u32) -> Self {
        let mut bytes = [0_u8; SALT_RANDOM_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self {
            raw: format!("${SALT_VERSION}${rounds}${}", hex::encode(bytes)),
            rounds,
        }
    }

    /// Validate a previously generated salt.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CredentialFormatError> {
        let raw = raw.into();
        let rounds = salt_regex()
            .captures(&raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or(CredentialFormatError::MalformedSalt)?;
        Ok(Self { raw, rounds })
    }

    /// Cost factor recorded in the salt.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Full salt string.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Salt> for String {
    fn from(value: Salt) -> Self {
        value.raw
    }
}

impl TryFrom<String> for Salt {
    type Error = CredentialFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Hex-encoded PBKDF2-HMAC-SHA512 digest of a password and salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Derive the digest. Pure: equal inputs give equal output.
    pub fn derive(password: &str, salt: &Salt) -> Self {
        let mut key = Zeroizing::new([0_u8; HASH_BYTES]);
        pbkdf2::pbkdf2_hmac::<Sha512>(
            password.as_bytes(),
            salt.as_str().as_bytes(),
            HASH_ITERATIONS,
            key.as_mut_slice(),
        );
        Self(hex::encode(key.as_slice()))
    }

    /// Validate a previously derived digest.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CredentialFormatError> {
        let raw = raw.into();
        if !hash_regex().is_match(&raw) {
            return Err(CredentialFormatError::MalformedHash);
        }
        Ok(Self(raw))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn matches(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HashedPassword> for String {
    fn from(value: HashedPassword) -> Self {
        value.0
    }
}

impl TryFrom<String> for HashedPassword {
    type Error = CredentialFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Salt and hash joined as `<salt>$<hash>`.
///
/// The hash is the last `$`-delimited segment, so the random part of the salt
/// is the second-to-last one. [`compare_password`] only accepts this layout.
///
/// # Examples
/// ```
/// use backend::domain::{HashedPassword, Salt, StoredCredential};
///
/// let salt = Salt::generate(10);
/// let hash = HashedPassword::derive("Abcdef1!", &salt);
/// let stored = StoredCredential::new(salt.clone(), hash).to_string();
/// let parsed: StoredCredential = stored.parse().expect("layout round-trips");
/// assert_eq!(parsed.salt(), &salt);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    salt: Salt,
    hash: HashedPassword,
}

impl StoredCredential {
    /// Pair a salt with the hash derived from it.
    pub fn new(salt: Salt, hash: HashedPassword) -> Self {
        Self { salt, hash }
    }

    /// Salt half of the credential.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// Hash half of the credential.
    pub fn hash(&self) -> &HashedPassword {
        &self.hash
    }

    /// Whether `password` hashes to the stored digest under the stored salt.
    pub fn verify(&self, password: &str) -> bool {
        HashedPassword::derive(password, &self.salt).matches(&self.hash)
    }
}

impl fmt::Display for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}${}", self.salt, self.hash)
    }
}

impl FromStr for StoredCredential {
    type Err = CredentialFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt, hash) = s
            .rsplit_once('$')
            .ok_or(CredentialFormatError::MissingSeparator)?;
        Ok(Self {
            salt: Salt::parse(salt)?,
            hash: HashedPassword::parse(hash)?,
        })
    }
}

/// Generate a salt on the calling thread.
pub fn generate_salt(rounds: u32) -> Salt {
    Salt::generate(rounds)
}

/// Generate a salt on the blocking pool.
pub async fn generate_salt_async(rounds: u32) -> Result<Salt, HashingError> {
    Ok(tokio::task::spawn_blocking(move || Salt::generate(rounds)).await?)
}

/// Hash a password on the calling thread.
pub fn hash_password(password: &str, salt: &Salt) -> HashedPassword {
    HashedPassword::derive(password, salt)
}

/// Hash a password on the blocking pool.
pub async fn hash_password_async(
    password: &str,
    salt: &Salt,
) -> Result<HashedPassword, HashingError> {
    let password = Zeroizing::new(password.to_owned());
    let salt = salt.clone();
    Ok(tokio::task::spawn_blocking(move || HashedPassword::derive(&password, &salt)).await?)
}

/// Check `password` against a `<salt>$<hash>` string.
///
/// Malformed stored values never match.
pub fn compare_password(password: &str, stored: &str) -> bool {
    stored
        .parse::<StoredCredential>()
        .is_ok_and(|credential| credential.verify(password))
}

/// Suspending form of [`compare_password`].
pub async fn compare_password_async(password: &str, stored: &str) -> Result<bool, HashingError> {
    let Ok(credential) = stored.parse::<StoredCredential>() else {
        return Ok(false);
    };
    let password = Zeroizing::new(password.to_owned());
    Ok(tokio::task::spawn_blocking(move || credential.verify(&password)).await?)
}

/// Execution strategy for salt and hash generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashingMode {
    /// Compute on the calling task.
    #[default]
    Blocking,
    /// Compute on the blocking pool and await the result.
    Suspending,
}

/// Salt-and-hash strategy injected into the registration service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialHasher {
    mode: HashingMode,
    rounds: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(HashingMode::default(), DEFAULT_SALT_ROUNDS)
    }
}

impl CredentialHasher {
    /// Build a hasher with an explicit mode and salt cost factor.
    pub fn new(mode: HashingMode, rounds: u32) -> Self {
        Self { mode, rounds }
    }

    /// Configured execution strategy.
    pub fn mode(&self) -> HashingMode {
        self.mode
    }

    /// Cost factor written into generated salts.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Produce a fresh salt and the password hash derived from it.
    pub async fn derive(&self, password: &str) -> Result<(Salt, HashedPassword), HashingError> {
        match self.mode {
            HashingMode::Blocking => {
                let salt = generate_salt(self.rounds);
                let hash = hash_password(password, &salt);
                Ok((salt, hash))
            }
            HashingMode::Suspending => {
                let salt = generate_salt_async(self.rounds).await?;
                let hash = hash_password_async(password, &salt).await?;
                Ok((salt, hash))
            }
        }
    }
}
