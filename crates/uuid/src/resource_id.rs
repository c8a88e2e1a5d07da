//! Resource identifiers and the providers that allocate them.

use crate::{UuidError, UuidResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Maximum length of a FHIR `id`.
const MAX_ID_LEN: usize = 64;

/// A validated FHIR resource identifier.
///
/// Once constructed, the contained value is guaranteed to be a legal FHIR `id`, so it can be
/// embedded in entry locators (`Condition/<id>`) and references without further checks.
///
/// # Construction
/// - [`ResourceId::new`] generates a fresh random identifier (hyphenated UUID v4).
/// - [`ResourceId::parse`] validates an externally supplied identifier, such as a patient id
///   taken from the request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceId {
    /// Generates a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Validates and wraps an identifier string.
    ///
    /// Surrounding whitespace is not trimmed; callers must supply the exact identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not a legal FHIR `id`.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if Self::is_valid(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(UuidError::InvalidInput(format!(
            "resource id must be 1-64 characters of [A-Za-z0-9-.], got: '{}'",
            input
        )))
    }

    /// Returns true if `input` is a legal FHIR `id`.
    ///
    /// This is a purely syntactic check and can be used for pre-validation.
    pub fn is_valid(input: &str) -> bool {
        !input.is_empty()
            && input.len() <= MAX_ID_LEN
            && input
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.'))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Allocates identifiers for the resources of one document.
///
/// Identifiers must be unique within a bundle. Global uniqueness is not required.
pub trait IdentityProvider: Send + Sync {
    /// Returns a fresh identifier.
    fn new_id(&self) -> ResourceId;
}

/// Random UUID v4 identifiers. The production provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdProvider;

impl IdentityProvider for UuidIdProvider {
    fn new_id(&self) -> ResourceId {
        ResourceId::new()
    }
}

/// Deterministic identifiers of the form `<prefix>-<n>`, starting at 1.
///
/// Used by tests and reproducible CLI runs. The counter is atomic so a single provider may be
/// shared by reference across threads, although each document normally owns its own.
#[derive(Debug)]
pub struct SequentialIdProvider {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdProvider {
    /// Creates a provider with the given prefix.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if the prefix would produce illegal identifiers.
    pub fn new(prefix: &str) -> UuidResult<Self> {
        // Leave room for "-" and a u64 counter (20 digits).
        if prefix.len() > MAX_ID_LEN - 21 || !ResourceId::is_valid(prefix) {
            return Err(UuidError::InvalidInput(format!(
                "invalid identifier prefix: '{}'",
                prefix
            )));
        }
        Ok(Self {
            prefix: prefix.to_owned(),
            next: AtomicU64::new(1),
        })
    }
}

impl IdentityProvider for SequentialIdProvider {
    fn new_id(&self) -> ResourceId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ResourceId(format!("{}-{}", self.prefix, n))
    }
}
