//! Input validation utilities.
//!
//! This module contains functions for validating configuration values before they are embedded
//! into every generated document.

use crate::{AssemblyError, AssemblyResult};

/// Validates that a language tag has BCP-47 shape: ASCII alphanumeric subtags of 1-8
/// characters separated by `-`.
///
/// # Errors
///
/// Returns `AssemblyError::InvalidConfig` if the tag is malformed.
pub fn validate_language_tag(tag: &str) -> AssemblyResult<()> {
    let ok = !tag.is_empty()
        && tag.split('-').all(|subtag| {
            (1..=8).contains(&subtag.len()) && subtag.bytes().all(|b| b.is_ascii_alphanumeric())
        });

    if !ok {
        return Err(AssemblyError::InvalidConfig(format!(
            "language tag is not a valid BCP-47 tag: '{tag}'"
        )));
    }
    Ok(())
}

/// Validates that an identifier system is safe to embed as a URI.
///
/// - Rejects empty or whitespace-only strings
/// - Bounds the length to avoid pathological inputs
/// - Restricts to printable ASCII without whitespace
///
/// # Errors
///
/// Returns `AssemblyError::InvalidConfig` if the system is invalid.
pub fn validate_identifier_system(system: &str) -> AssemblyResult<()> {
    const MAX_SYSTEM_LEN: usize = 2048;

    if system.trim().is_empty() {
        return Err(AssemblyError::InvalidConfig(
            "identifier system cannot be empty".into(),
        ));
    }

    if system.len() > MAX_SYSTEM_LEN {
        return Err(AssemblyError::InvalidConfig(format!(
            "identifier system exceeds maximum length of {} characters",
            MAX_SYSTEM_LEN
        )));
    }

    if !system.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(AssemblyError::InvalidConfig(
            "identifier system must be printable ASCII without whitespace".into(),
        ));
    }

    if !system.contains(':') {
        return Err(AssemblyError::InvalidConfig(
            "identifier system must be an absolute URI".into(),
        ));
    }

    Ok(())
}
