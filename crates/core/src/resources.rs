//! Resource builders.
//!
//! Responsibilities:
//! - Construct each clinical resource kind with consistent identity, status, timestamp, profile
//!   and subject handling.
//! - Render narratives from the fields supplied to the builder, and nothing else.
//!
//! Notes:
//! - Every builder starts from [`ResourceFactory::stamp`], so identity and timestamp handling
//!   cannot drift between kinds.
//! - Builders never fail on unresolved terminology. The only structural requirement (a valid
//!   patient reference) is checked once when the factory is created.

use crate::constants::{
    ALLERGY_CLINICAL_SYSTEM, ALLERGY_VERIFICATION_SYSTEM, CONDITION_CLINICAL_SYSTEM,
    PROFILE_ALLERGY_INTOLERANCE, PROFILE_CONDITION, PROFILE_DIAGNOSTIC_REPORT,
    PROFILE_DOCUMENT_REFERENCE, PROFILE_OBSERVATION, PROFILE_OBSERVATION_WOMEN_HEALTH,
    PROFILE_OP_CONSULT_RECORD,
};
use crate::narrative;
use crate::{AssemblyError, AssemblyResult};
use artifacts_types::NonEmptyText;
use artifacts_uuid::{Clock, IdentityProvider, ResourceId};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use fhir::{
    AllergyCategory, AllergyIntolerance, Annotation, Attachment, CodeableTerm, Condition,
    DiagnosticReport, DocumentContent, DocumentReference, DocumentReferenceStatus, Meta,
    Observation, ObservationStatus, Quantity, Reference, ReportStatus, ResourceKind,
};

/// Identity, timestamp, profile and subject shared by every freshly built resource.
#[derive(Clone, Debug)]
pub struct Stamp {
    pub id: ResourceId,
    pub at: DateTime<Utc>,
    pub meta: Meta,
    pub subject: Reference,
}

/// The structure-definition profile a resource kind is published under.
pub fn profile_for(kind: ResourceKind) -> Option<&'static str> {
    match kind {
        ResourceKind::Composition => Some(PROFILE_OP_CONSULT_RECORD),
        ResourceKind::Condition => Some(PROFILE_CONDITION),
        ResourceKind::Observation => Some(PROFILE_OBSERVATION),
        ResourceKind::DiagnosticReport => Some(PROFILE_DIAGNOSTIC_REPORT),
        ResourceKind::DocumentReference => Some(PROFILE_DOCUMENT_REFERENCE),
        ResourceKind::AllergyIntolerance => Some(PROFILE_ALLERGY_INTOLERANCE),
        ResourceKind::Patient => None,
    }
}

/// Which observation profile to publish under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationProfile {
    General,
    WomenHealth,
}

/// The value an observation records.
#[derive(Clone, Debug, PartialEq)]
pub enum ObservationValue {
    Quantity { value: f64, unit: Option<String> },
    Text(String),
    Absent,
}

impl ObservationValue {
    fn describe(&self) -> String {
        match self {
            ObservationValue::Quantity { value, unit: Some(u) } => format!("{value} {u}"),
            ObservationValue::Quantity { value, unit: None } => value.to_string(),
            ObservationValue::Text(t) => t.clone(),
            ObservationValue::Absent => String::new(),
        }
    }
}

/// Builds resources for one patient.
pub struct ResourceFactory<'a> {
    ids: &'a dyn IdentityProvider,
    clock: &'a dyn Clock,
    subject: Reference,
}

impl<'a> ResourceFactory<'a> {
    /// Creates a factory whose resources all reference `Patient/<patient_id>`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidInput`] if the patient id is blank or not a valid
    /// resource id.
    pub fn new(
        ids: &'a dyn IdentityProvider,
        clock: &'a dyn Clock,
        patient_id: &str,
        patient_name: Option<&str>,
    ) -> AssemblyResult<Self> {
        let raw = NonEmptyText::new(patient_id)
            .map_err(|_| AssemblyError::InvalidInput("patient reference is required".into()))?;
        let id = ResourceId::parse(raw.as_str()).map_err(|e| {
            AssemblyError::InvalidInput(format!("patient reference is not a valid id: {e}"))
        })?;

        let mut subject = Reference::to(ResourceKind::Patient, &id);
        if let Some(name) = NonEmptyText::from_optional(patient_name) {
            subject = subject.with_display(name.as_str());
        }

        Ok(Self {
            ids,
            clock,
            subject,
        })
    }

    pub fn subject(&self) -> &Reference {
        &self.subject
    }

    /// The generic initialiser every builder starts from.
    pub fn stamp(&self, kind: ResourceKind) -> Stamp {
        let at = self.clock.now();
        let meta = match profile_for(kind) {
            Some(profile) => Meta::profiled(profile, at),
            None => Meta {
                last_updated: Some(at),
                profile: Vec::new(),
            },
        };

        Stamp {
            id: self.ids.new_id(),
            at,
            meta,
            subject: self.subject.clone(),
        }
    }

    pub fn condition(&self, code: Option<CodeableTerm>, name: &str) -> Condition {
        let stamp = self.stamp(ResourceKind::Condition);
        let label = display_name(code.as_ref(), name);

        Condition {
            id: stamp.id,
            meta: Some(stamp.meta),
            text: Some(narrative::render(
                "Condition",
                &[("Name", label.as_str()), ("Clinical status", "active")],
            )),
            clinical_status: CodeableTerm::new(CONDITION_CLINICAL_SYSTEM, "active", "Active"),
            code,
            subject: stamp.subject,
            recorded_date: stamp.at,
        }
    }

    pub fn observation(
        &self,
        profile: ObservationProfile,
        code: Option<CodeableTerm>,
        name: &str,
        value: ObservationValue,
    ) -> Observation {
        let mut stamp = self.stamp(ResourceKind::Observation);
        if profile == ObservationProfile::WomenHealth {
            stamp.meta.profile = vec![PROFILE_OBSERVATION_WOMEN_HEALTH.into()];
        }
        let label = display_name(code.as_ref(), name);
        let described = value.describe();
        let text = narrative::render(
            "Observation",
            &[("Name", label.as_str()), ("Value", described.as_str())],
        );

        let (value_quantity, value_string) = match value {
            ObservationValue::Quantity { value, unit } => (Some(Quantity { value, unit }), None),
            ObservationValue::Text(t) => (None, Some(t)),
            ObservationValue::Absent => (None, None),
        };

        Observation {
            id: stamp.id,
            meta: Some(stamp.meta),
            text: Some(text),
            status: ObservationStatus::Final,
            code,
            subject: stamp.subject,
            effective_date_time: stamp.at,
            value_quantity,
            value_string,
        }
    }

    pub fn diagnostic_report(
        &self,
        code: Option<CodeableTerm>,
        name: &str,
        result: Vec<Reference>,
    ) -> DiagnosticReport {
        let stamp = self.stamp(ResourceKind::DiagnosticReport);
        let label = display_name(code.as_ref(), name);
        let count = result.len().to_string();

        DiagnosticReport {
            id: stamp.id,
            meta: Some(stamp.meta),
            text: Some(narrative::render(
                "Diagnostic report",
                &[("Name", label.as_str()), ("Results", count.as_str())],
            )),
            status: ReportStatus::Final,
            code,
            subject: stamp.subject,
            issued: stamp.at,
            result,
        }
    }

    /// Wraps opaque report content.
    ///
    /// Content given as a `data:<mime>;base64,<payload>` URI is carried through with its media
    /// type; anything else is treated as UTF-8 plain text and base64-encoded.
    pub fn document_reference(
        &self,
        code: Option<CodeableTerm>,
        title: &str,
        content: &str,
    ) -> DocumentReference {
        let stamp = self.stamp(ResourceKind::DocumentReference);
        let (content_type, data) = encode_content(content);

        DocumentReference {
            id: stamp.id,
            meta: Some(stamp.meta),
            status: DocumentReferenceStatus::Current,
            doc_type: code,
            subject: stamp.subject,
            date: stamp.at,
            content: vec![DocumentContent {
                attachment: Attachment {
                    content_type,
                    data,
                    title: Some(title.to_string()),
                    creation: Some(stamp.at),
                },
            }],
        }
    }

    pub fn allergy(
        &self,
        code: Option<CodeableTerm>,
        name: &str,
        allergy_type: Option<&str>,
    ) -> AllergyIntolerance {
        let stamp = self.stamp(ResourceKind::AllergyIntolerance);
        let kind = allergy_type.map(str::trim).unwrap_or_default();
        let label = display_name(code.as_ref(), name);
        let note = format!(
            "The patient reports of: {} allergy which is of type: {}",
            name.trim(),
            if kind.is_empty() { "unspecified" } else { kind }
        );

        AllergyIntolerance {
            id: stamp.id,
            meta: Some(stamp.meta),
            text: Some(narrative::render(
                "Allergy",
                &[("Substance", label.as_str()), ("Type", kind)],
            )),
            clinical_status: CodeableTerm::new(ALLERGY_CLINICAL_SYSTEM, "active", "Active"),
            verification_status: CodeableTerm::new(
                ALLERGY_VERIFICATION_SYSTEM,
                "confirmed",
                "Confirmed",
            ),
            category: AllergyCategory::parse(kind).into_iter().collect(),
            code,
            patient: stamp.subject,
            recorded_date: stamp.at,
            note: vec![Annotation { text: note }],
        }
    }
}

fn display_name(code: Option<&CodeableTerm>, name: &str) -> String {
    code.and_then(CodeableTerm::label)
        .unwrap_or_else(|| name.trim())
        .to_string()
}

fn encode_content(content: &str) -> (String, String) {
    if let Some(rest) = content.strip_prefix("data:") {
        if let Some((mime, payload)) = rest.split_once(";base64,") {
            if !mime.is_empty() && BASE64.decode(payload).is_ok() {
                return (mime.to_string(), payload.to_string());
            }
        }
    }
    ("text/plain".to_string(), BASE64.encode(content.as_bytes()))
}
