//! FHIR R4 wire model for clinical consultation documents.
//!
//! This crate provides the **document model** produced by the assembly engine and the
//! **codec** that turns it into canonical FHIR JSON text and back:
//! - data types (`CodeableTerm`, `Reference`, `Meta`, `Narrative`, ...)
//! - the clinical resources a consultation document carries
//! - the `Composition` header and its sections
//! - the `Bundle` that packages everything, plus [`BundleCodec`]
//!
//! This crate focuses on:
//! - FHIR structural alignment (field names, `resourceType` tagging, absent-field omission)
//! - deterministic serialisation (fixed field order, no maps)
//! - strict deserialisation for round-trip validation
//!
//! It holds no assembly logic. Deciding which resources exist and how they link is the job of
//! `artifacts-core`.

pub mod bundle;
pub mod codec;
pub mod composition;
pub mod datatypes;
pub mod resources;

pub use bundle::{Bundle, BundleEntry, BundleTag, BundleType};
pub use codec::BundleCodec;
pub use composition::{Composition, CompositionStatus, Section};
pub use datatypes::{
    Annotation, Attachment, CodeableTerm, Coding, Identifier, Meta, Narrative, NarrativeStatus,
    Quantity, Reference,
};
pub use resources::{
    AllergyCategory, AllergyIntolerance, Condition, DiagnosticReport, DocumentContent,
    DocumentReference, DocumentReferenceStatus, Observation, ObservationStatus, ReportStatus,
    Resource, ResourceKind,
};

// Re-export ResourceId from artifacts_uuid crate
pub use artifacts_uuid::ResourceId;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
