//! Assembly runtime configuration.
//!
//! This module defines configuration that is resolved once at process startup and then passed
//! into the assembly service by shared reference. Core code never reads environment variables;
//! binaries read them and hand the raw values to [`AssemblyConfig::from_env_values`].

use crate::constants::{DEFAULT_IDENTIFIER_SYSTEM, DEFAULT_LANGUAGE};
use crate::terminology::CodeTables;
use crate::validation::{validate_identifier_system, validate_language_tag};
use crate::{AssemblyError, AssemblyResult};
use std::sync::Arc;

/// Assembly configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AssemblyConfig {
    tables: Arc<CodeTables>,
    language: String,
    identifier_system: String,
    pretty: bool,
}

impl AssemblyConfig {
    /// Create a new `AssemblyConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidConfig`] if the language tag or identifier system is
    /// malformed.
    pub fn new(
        tables: Arc<CodeTables>,
        language: String,
        identifier_system: String,
        pretty: bool,
    ) -> AssemblyResult<Self> {
        validate_language_tag(&language)?;
        validate_identifier_system(&identifier_system)?;

        Ok(Self {
            tables,
            language,
            identifier_system,
            pretty,
        })
    }

    /// Build a configuration from optional raw values, applying defaults for anything unset.
    ///
    /// Blank values are treated as unset. `pretty` accepts `true/false`, `1/0`, `yes/no`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidConfig`] if any supplied value is invalid.
    pub fn from_env_values(
        language: Option<String>,
        identifier_system: Option<String>,
        pretty: Option<String>,
    ) -> AssemblyResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let pretty = match non_blank(pretty) {
            None => true,
            Some(v) => parse_flag(&v)?,
        };

        Self::new(
            Arc::new(CodeTables::standard()),
            non_blank(language).unwrap_or_else(|| DEFAULT_LANGUAGE.into()),
            non_blank(identifier_system).unwrap_or_else(|| DEFAULT_IDENTIFIER_SYSTEM.into()),
            pretty,
        )
    }

    pub fn tables(&self) -> &CodeTables {
        &self.tables
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn identifier_system(&self) -> &str {
        &self.identifier_system
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Returns a copy of this configuration with a different pretty-print setting.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            tables: Arc::new(CodeTables::standard()),
            language: DEFAULT_LANGUAGE.into(),
            identifier_system: DEFAULT_IDENTIFIER_SYSTEM.into(),
            pretty: true,
        }
    }
}

fn parse_flag(value: &str) -> AssemblyResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(AssemblyError::InvalidConfig(format!(
            "expected a boolean flag, got '{other}'"
        ))),
    }
}
