//! The document header (`Composition`) and its sections.

use crate::datatypes::{CodeableTerm, Identifier, Meta, Reference};
use crate::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Composition workflow status. Consultation documents are always issued as `final`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionStatus {
    Preliminary,
    Final,
    Amended,
    EnteredInError,
}

/// A named, coded grouping of references to resources in the same bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<Reference>,
}

impl Section {
    pub fn new(title: impl Into<String>, code: CodeableTerm) -> Self {
        Self {
            title: title.into(),
            code: Some(code),
            entry: Vec::new(),
        }
    }
}

/// The document header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    pub language: String,
    pub identifier: Identifier,
    pub status: CompositionStatus,
    #[serde(rename = "type")]
    pub doc_type: CodeableTerm,
    pub subject: Reference,
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<Section>,
}
