//! Per-field validation predicates.
//!
//! Every predicate is pure and answers a yes/no question about one submitted
//! value. Field-level policy (which predicate applies to which name, and the
//! failure message) lives in [`crate::domain::registration_validator`].

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::registration::FieldValue;

/// Characters a password must draw at least one symbol from.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";
/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Youngest accepted age.
pub const AGE_MIN: i64 = 18;
/// Oldest accepted age.
pub const AGE_MAX: i64 = 100;
/// Accepted gender values, compared case-insensitively.
pub const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Inclusive UTF-16 length bounds for free-text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl LengthRange {
    /// Build a range; `min` must not exceed `max`.
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Bounds for `firstname`.
pub const FIRSTNAME_LENGTH: LengthRange = LengthRange::new(1, 8);
/// Bounds for `lastname`.
pub const LASTNAME_LENGTH: LengthRange = LengthRange::new(1, 8);
/// Bounds for `address`.
pub const ADDRESS_LENGTH: LengthRange = LengthRange::new(1, 100);

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| {
                Regex::new($pattern).unwrap_or_else(|error| {
                    panic!(concat!(stringify!($name), " failed to compile: {}"), error)
                })
            })
        }
    };
}

cached_regex!(username_regex, "^[A-Za-z0-9]{8,}$");
cached_regex!(email_regex, r"^[^\s@]+@[^\s@]+\.[^\s@]+$");
cached_regex!(password_charset_regex, "^[A-Za-z0-9@$!%*?&]*$");
cached_regex!(phone_number_regex, "^[0-9]{10}$");

fn text_matches(value: &FieldValue, regex: &Regex) -> bool {
    value.to_text().is_some_and(|text| regex.is_match(&text))
}

/// Alphanumeric, at least eight characters.
pub fn username(value: &FieldValue) -> bool {
    text_matches(value, username_regex())
}

/// `local@domain.tld` shape without whitespace.
pub fn email(value: &FieldValue) -> bool {
    text_matches(value, email_regex())
}

/// At least eight characters mixing lowercase, uppercase, a digit and one of
/// [`PASSWORD_SYMBOLS`], with nothing outside those classes.
///
/// # Examples
/// ```
/// use backend::domain::{FieldValue, field_validators};
///
/// assert!(field_validators::password(&FieldValue::from("Abcdef1!")));
/// assert!(!field_validators::password(&FieldValue::from("alllowercase1!")));
/// ```
pub fn password(value: &FieldValue) -> bool {
    let Some(text) = value.to_text() else {
        return false;
    };
    text.chars().count() >= PASSWORD_MIN_LEN
        && password_charset_regex().is_match(&text)
        && text.chars().any(|c| c.is_ascii_lowercase())
        && text.chars().any(|c| c.is_ascii_uppercase())
        && text.chars().any(|c| c.is_ascii_digit())
        && text.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// String whose length in UTF-16 code units falls inside `range`.
///
/// Characters outside the Basic Multilingual Plane count twice, so eight
/// emoji exceed an eight-unit bound. Non-string values never pass.
pub fn length(value: &FieldValue, range: LengthRange) -> bool {
    value
        .as_str()
        .map(|text| text.encode_utf16().count())
        .is_some_and(|count| (range.min..=range.max).contains(&count))
}

/// Exactly ten decimal digits. Numeric JSON values are checked via their text.
pub fn phone_number(value: &FieldValue) -> bool {
    text_matches(value, phone_number_regex())
}

/// One of [`GENDERS`], ignoring case.
pub fn gender(value: &FieldValue) -> bool {
    value.as_str().is_some_and(|text| {
        let lowered = text.to_lowercase();
        GENDERS.contains(&lowered.as_str())
    })
}

/// Integer between [`AGE_MIN`] and [`AGE_MAX`] inclusive.
///
/// Only the leading integer of the text counts, so `"25 years"` reads as 25
/// and `"2.5"` as 2.
pub fn age(value: &FieldValue) -> bool {
    value
        .to_text()
        .and_then(|text| leading_integer(&text))
        .is_some_and(|age| (AGE_MIN..=AGE_MAX).contains(&age))
}

fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest.get(..digits_end)?.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
