//! # Artifacts Core
//!
//! Document assembly engine for OP consultation records.
//!
//! This crate turns one patient's structured encounter data into a FHIR document bundle:
//! - code lookup tables and the lab-panel matcher
//! - resource builders with shared identity/timestamp handling
//! - one section assembler per clinical category, run in a fixed order
//! - the document composer and bundle builder, with a final consistency check
//!
//! **No API concerns**: HTTP servers, CLI parsing and environment handling belong in `api-rest`,
//! `cli` and the binaries. Core code never reads environment variables.

pub mod bundle;
pub mod composer;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod matcher;
pub mod narrative;
pub mod resources;
pub mod sections;
pub mod terminology;
pub mod validation;
pub mod warning;

pub use composer::{AssembledDocument, DocumentComposer};
pub use config::AssemblyConfig;
pub use error::{AssemblyError, AssemblyResult};
pub use input::{Category, ClinicalData};
pub use terminology::{CodeTables, TermCategory};
pub use warning::{AssemblyWarning, WarningKind};

use artifacts_uuid::{Clock, IdentityProvider, SystemClock, UuidIdProvider};
use fhir::{Bundle, BundleCodec};
use std::sync::Arc;

/// Serialised document text plus the warnings raised while assembling it.
#[derive(Clone, Debug)]
pub struct GeneratedDocument {
    pub text: String,
    pub warnings: Vec<AssemblyWarning>,
}

/// Assembly service shared across requests.
///
/// Holds only read-only configuration and thread-safe collaborators, so one instance can serve
/// concurrent requests without locking.
#[derive(Clone)]
pub struct ArtifactService {
    cfg: Arc<AssemblyConfig>,
    ids: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
}

impl ArtifactService {
    /// Creates a service with random UUID identifiers and the system clock.
    pub fn new(cfg: Arc<AssemblyConfig>) -> Self {
        Self::with_collaborators(cfg, Arc::new(UuidIdProvider), Arc::new(SystemClock))
    }

    pub fn with_collaborators(
        cfg: Arc<AssemblyConfig>,
        ids: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { cfg, ids, clock }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.cfg
    }

    /// Assembles a document bundle.
    ///
    /// # Errors
    ///
    /// Returns an [`AssemblyError`] on any structural fault. No partial document is returned.
    pub fn assemble(&self, data: &ClinicalData) -> AssemblyResult<AssembledDocument> {
        let composer = DocumentComposer::new(&self.cfg, self.ids.as_ref(), self.clock.as_ref());
        match composer.compose(data) {
            Ok(doc) => {
                tracing::info!(
                    bundle = %doc.bundle.id,
                    entries = doc.bundle.entry.len(),
                    warnings = doc.warnings.len(),
                    "document assembled"
                );
                Ok(doc)
            }
            Err(e) => {
                tracing::error!(error = %e, "document assembly failed");
                Err(e)
            }
        }
    }

    /// Assembles a document and encodes it with the configured formatting.
    ///
    /// # Errors
    ///
    /// Returns an [`AssemblyError`] on any structural or encoding fault.
    pub fn generate(&self, data: &ClinicalData) -> AssemblyResult<GeneratedDocument> {
        let doc = self.assemble(data)?;
        let text = BundleCodec::encode(&doc.bundle, self.cfg.pretty()).map_err(|e| {
            tracing::error!(error = %e, "document encoding failed");
            AssemblyError::from(e)
        })?;
        Ok(GeneratedDocument {
            text,
            warnings: doc.warnings,
        })
    }

    /// Decodes a serialised document and checks its structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Encoding`] if the text is not a bundle, or the first consistency
    /// violation found.
    pub fn validate_document(text: &str) -> AssemblyResult<Bundle> {
        let bundle = BundleCodec::decode(text)?;
        bundle::check_consistency(&bundle)?;
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifacts_uuid::{FixedClock, SequentialIdProvider};
    use chrono::{TimeZone, Utc};

    fn service(pretty: bool) -> ArtifactService {
        ArtifactService::with_collaborators(
            Arc::new(AssemblyConfig::default().with_pretty(pretty)),
            Arc::new(SequentialIdProvider::new("svc").unwrap()),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())),
        )
    }

    fn input() -> ClinicalData {
        serde_yaml::from_str(
            "patient:\n  id: pat-9\nallergyIntolerance:\n  - name: Egg\n    type: food\n  - name: Pollen\n    type: environment\n",
        )
        .unwrap()
    }

    #[test]
    fn generate_encodes_and_reports_warnings() {
        let out = service(false).generate(&input()).unwrap();
        assert!(!out.text.contains('\n'));
        assert!(out.text.starts_with(r#"{"resourceType":"Bundle""#));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].item, "Pollen");
    }

    #[test]
    fn generated_text_validates() {
        let out = service(true).generate(&input()).unwrap();
        assert!(out.text.contains('\n'));
        let bundle = ArtifactService::validate_document(&out.text).unwrap();
        assert_eq!(bundle.entry.len(), 3);
    }

    #[test]
    fn validate_rejects_non_bundles() {
        assert!(matches!(
            ArtifactService::validate_document(r#"{"resourceType":"Patient"}"#),
            Err(AssemblyError::Encoding(_))
        ));
    }

    #[test]
    fn assembly_failures_are_uniform() {
        let mut data = input();
        data.patient.id = String::new();
        let err = service(true).assemble(&data).unwrap_err();
        assert_eq!(err.public_message(), "assembly failed");
    }

    #[test]
    fn non_finite_lab_values_never_reach_the_encoder() {
        let nan: ClinicalData =
            serde_yaml::from_str("patient:\n  id: pat-9\ndiagnostic:\n  cbc:\n    hemoglobin: .nan\n")
                .unwrap();
        assert!(matches!(
            service(false).generate(&nan),
            Err(AssemblyError::InvalidInput(_))
        ));

        let inf: ClinicalData = serde_yaml::from_str(
            "patient:\n  id: pat-9\ndiagnostic:\n  bioChemistry:\n    lipidProfile:\n      tests:\n        - testName: Total Cholesterol\n          result: .inf\n          unitOfMeasurement: mg/dL\n",
        )
        .unwrap();
        assert!(matches!(
            service(false).generate(&inf),
            Err(AssemblyError::InvalidInput(_))
        ));
    }
}
