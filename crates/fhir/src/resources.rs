//! Clinical resources carried by a consultation document.
//!
//! Each resource kind is a plain struct; [`Resource`] is the `resourceType`-tagged union that
//! appears inside bundle entries. Resources are value types: they are built once by the
//! assembly engine, moved into the bundle, and never mutated afterwards.

use crate::composition::Composition;
use crate::datatypes::{Annotation, Attachment, CodeableTerm, Meta, Narrative, Quantity, Reference};
use crate::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Resource kinds
// ============================================================================

/// The resource types that may appear in a consultation document bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Composition,
    Condition,
    Observation,
    DiagnosticReport,
    DocumentReference,
    AllergyIntolerance,
    /// Only ever the target of a subject reference; never a bundle entry.
    Patient,
}

impl ResourceKind {
    /// Returns the FHIR `resourceType` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Composition => "Composition",
            Self::Condition => "Condition",
            Self::Observation => "Observation",
            Self::DiagnosticReport => "DiagnosticReport",
            Self::DocumentReference => "DocumentReference",
            Self::AllergyIntolerance => "AllergyIntolerance",
            Self::Patient => "Patient",
        }
    }

    /// Returns the entry locator for a resource of this kind: `<kind>/<id>`.
    pub fn locator(&self, id: &ResourceId) -> String {
        format!("{}/{}", self.as_str(), id)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Status enumerations
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservationStatus {
    Registered,
    Preliminary,
    Final,
    Amended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Registered,
    Partial,
    Preliminary,
    Final,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentReferenceStatus {
    Current,
    Superseded,
    EnteredInError,
}

/// Allergy category, as defined by FHIR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergyCategory {
    Food,
    Medication,
    Environment,
    Biologic,
}

impl AllergyCategory {
    /// Parses a free-text allergy type, case-insensitively. Unknown types yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "medication" | "drug" => Some(Self::Medication),
            "environment" | "environmental" => Some(Self::Environment),
            "biologic" => Some(Self::Biologic),
            _ => None,
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

/// A clinical condition, problem or diagnosis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,
    pub clinical_status: CodeableTerm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableTerm>,
    pub subject: Reference,
    pub recorded_date: DateTime<Utc>,
}

/// A measurement or simple assertion.
///
/// Exactly one of `value_quantity` and `value_string` is set by the builders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,
    pub status: ObservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableTerm>,
    pub subject: Reference,
    pub effective_date_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

/// The findings of a diagnostic investigation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableTerm>,
    pub subject: Reference,
    pub issued: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub result: Vec<Reference>,
}

/// One content element of a document reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContent {
    pub attachment: Attachment,
}

/// A wrapper around an opaque document (free-text report or binary).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    pub status: DocumentReferenceStatus,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<CodeableTerm>,
    pub subject: Reference,
    pub date: DateTime<Utc>,
    pub content: Vec<DocumentContent>,
}

/// A record of an allergy or intolerance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntolerance {
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,
    pub clinical_status: CodeableTerm,
    pub verification_status: CodeableTerm,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<AllergyCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableTerm>,
    pub patient: Reference,
    pub recorded_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,
}

// ============================================================================
// Tagged union
// ============================================================================

/// Any resource that may appear as a bundle entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Composition(Composition),
    Condition(Condition),
    Observation(Observation),
    DiagnosticReport(DiagnosticReport),
    DocumentReference(DocumentReference),
    AllergyIntolerance(AllergyIntolerance),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Composition(_) => ResourceKind::Composition,
            Self::Condition(_) => ResourceKind::Condition,
            Self::Observation(_) => ResourceKind::Observation,
            Self::DiagnosticReport(_) => ResourceKind::DiagnosticReport,
            Self::DocumentReference(_) => ResourceKind::DocumentReference,
            Self::AllergyIntolerance(_) => ResourceKind::AllergyIntolerance,
        }
    }

    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Composition(r) => &r.id,
            Self::Condition(r) => &r.id,
            Self::Observation(r) => &r.id,
            Self::DiagnosticReport(r) => &r.id,
            Self::DocumentReference(r) => &r.id,
            Self::AllergyIntolerance(r) => &r.id,
        }
    }

    /// Returns the entry locator: `<kind>/<id>`.
    pub fn locator(&self) -> String {
        self.kind().locator(self.id())
    }

    /// Returns the references this resource makes to other bundle entries.
    ///
    /// Subject and patient references are excluded; they point outside the bundle.
    pub fn internal_references(&self) -> Vec<&Reference> {
        match self {
            Self::Composition(c) => c.section.iter().flat_map(|s| s.entry.iter()).collect(),
            Self::DiagnosticReport(r) => r.result.iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Condition> for Resource {
    fn from(value: Condition) -> Self {
        Self::Condition(value)
    }
}

impl From<Observation> for Resource {
    fn from(value: Observation) -> Self {
        Self::Observation(value)
    }
}

impl From<DiagnosticReport> for Resource {
    fn from(value: DiagnosticReport) -> Self {
        Self::DiagnosticReport(value)
    }
}

impl From<DocumentReference> for Resource {
    fn from(value: DocumentReference) -> Self {
        Self::DocumentReference(value)
    }
}

impl From<AllergyIntolerance> for Resource {
    fn from(value: AllergyIntolerance) -> Self {
        Self::AllergyIntolerance(value)
    }
}
