//! FHIR general-purpose data types used by the document model.
//!
//! Only the elements the consultation document actually populates are modelled. Optional
//! elements are omitted from the encoding when absent, so a decoded document re-encodes to the
//! same text.

use crate::{ResourceId, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical URI of the SNOMED CT code system.
pub const SNOMED_SYSTEM: &str = "http://snomed.info/sct";

/// Canonical URI of the LOINC code system.
pub const LOINC_SYSTEM: &str = "http://loinc.org";

/// One code from one code system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    pub system: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A coded clinical concept: (coding system, code, display text).
///
/// Encoded as a FHIR `CodeableConcept` carrying exactly one coding. The display text is
/// repeated in `text` so that consumers which only read `text` still see a label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeableTerm {
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableTerm {
    /// Builds a term from a system, a code and a display label.
    pub fn new(system: impl Into<String>, code: impl Into<String>, display: impl Into<String>) -> Self {
        let display = display.into();
        Self {
            coding: vec![Coding {
                system: system.into(),
                code: code.into(),
                display: Some(display.clone()),
            }],
            text: Some(display),
        }
    }

    /// Returns the first coding, if any.
    pub fn primary(&self) -> Option<&Coding> {
        self.coding.first()
    }

    /// Returns the code of the first coding, if any.
    pub fn code(&self) -> Option<&str> {
        self.primary().map(|c| c.code.as_str())
    }

    /// Returns the best human label: `text`, then the first coding's display.
    pub fn label(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or_else(|| self.primary().and_then(|c| c.display.as_deref()))
    }
}

/// A reference from one resource to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Builds a reference to `<kind>/<id>`.
    pub fn to(kind: ResourceKind, id: &ResourceId) -> Self {
        Self {
            reference: kind.locator(id),
            display: None,
        }
    }

    /// Attaches a display label.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// A business identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub system: String,
    pub value: String,
}

/// Resource metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
}

impl Meta {
    pub fn profiled(profile: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            last_updated: Some(last_updated),
            profile: vec![profile.into()],
        }
    }
}

/// Narrative status. Only machine-generated narratives are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeStatus {
    Generated,
    Extensions,
    Additional,
    Empty,
}

/// Human-readable summary of a resource, as an XHTML `div`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub status: NarrativeStatus,
    pub div: String,
}

/// A measured amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Opaque content carried inline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    /// Base64-encoded payload.
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<DateTime<Utc>>,
}

/// A free-text note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codeable_term_encodes_as_single_coding_concept() {
        let term = CodeableTerm::new(SNOMED_SYSTEM, "38341003", "Hypertension");
        let json = serde_json::to_value(&term).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "coding": [{
                    "system": "http://snomed.info/sct",
                    "code": "38341003",
                    "display": "Hypertension"
                }],
                "text": "Hypertension"
            })
        );
        assert_eq!(term.code(), Some("38341003"));
        assert_eq!(term.label(), Some("Hypertension"));
    }

    #[test]
    fn reference_uses_kind_locator() {
        let id = ResourceId::parse("cond-1").unwrap();
        let reference = Reference::to(ResourceKind::Condition, &id).with_display("Hypertension");
        assert_eq!(reference.reference, "Condition/cond-1");
        assert_eq!(reference.display.as_deref(), Some("Hypertension"));
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let meta = Meta {
            last_updated: None,
            profile: Vec::new(),
        };
        assert_eq!(serde_json::to_string(&meta).unwrap(), "{}");

        let quantity = Quantity {
            value: 13.5,
            unit: None,
        };
        assert_eq!(serde_json::to_string(&quantity).unwrap(), r#"{"value":13.5}"#);
    }
}
